//! Installed-state prober
//!
//! Checks whether an installed package descriptor exists under
//! `node_modules/<name>/package.json` and extracts its version. Probing
//! never fails: absence, unreadable descriptors, and descriptors without a
//! version field all report as "not installed", which the resolver treats as
//! needs-install. Every probe reads the filesystem fresh.

use crate::manifest::MANIFEST_FILE;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Directory containing installed packages
pub const MODULES_DIR: &str = "node_modules";

/// Expected install location of one module
pub fn module_dir(project: &Path, name: &str) -> PathBuf {
    project.join(MODULES_DIR).join(name)
}

/// Returns the installed version of a module, if any
pub async fn installed_version(project: &Path, name: &str) -> Option<String> {
    let descriptor = module_dir(project, name).join(MANIFEST_FILE);
    let content = tokio::fs::read_to_string(descriptor).await.ok()?;
    extract_version(&content)
}

/// Blocking variant for the on-demand resolver
pub fn installed_version_blocking(project: &Path, name: &str) -> Option<String> {
    let descriptor = module_dir(project, name).join(MANIFEST_FILE);
    let content = std::fs::read_to_string(descriptor).ok()?;
    extract_version(&content)
}

fn extract_version(content: &str) -> Option<String> {
    let descriptor: Value = serde_json::from_str(content).ok()?;
    descriptor
        .get("version")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn install_fixture(project: &Path, name: &str, descriptor: &str) {
        let dir = module_dir(project, name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), descriptor).unwrap();
    }

    #[test]
    fn test_absent_module() {
        let dir = TempDir::new().unwrap();
        assert!(installed_version_blocking(dir.path(), "blame").is_none());
    }

    #[test]
    fn test_present_module() {
        let dir = TempDir::new().unwrap();
        install_fixture(dir.path(), "blame", r#"{"name": "blame", "version": "1.1.2"}"#);

        assert_eq!(
            installed_version_blocking(dir.path(), "blame").as_deref(),
            Some("1.1.2")
        );
    }

    #[test]
    fn test_descriptor_without_version() {
        let dir = TempDir::new().unwrap();
        install_fixture(dir.path(), "blame", r#"{"name": "blame"}"#);

        assert!(installed_version_blocking(dir.path(), "blame").is_none());
    }

    #[test]
    fn test_unreadable_descriptor() {
        let dir = TempDir::new().unwrap();
        install_fixture(dir.path(), "blame", "not json at all");

        assert!(installed_version_blocking(dir.path(), "blame").is_none());
    }

    #[test]
    fn test_module_dir_layout() {
        let dir = module_dir(Path::new("/project"), "blame");
        assert_eq!(dir, PathBuf::from("/project/node_modules/blame"));
    }

    #[tokio::test]
    async fn test_async_probe() {
        let dir = TempDir::new().unwrap();
        install_fixture(dir.path(), "blame", r#"{"version": "2.0.0"}"#);

        assert_eq!(
            installed_version(dir.path(), "blame").await.as_deref(),
            Some("2.0.0")
        );
        assert!(installed_version(dir.path(), "absent").await.is_none());
    }
}
