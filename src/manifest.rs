//! Manifest reader for package.json projects
//!
//! Loads the manifest at a project root and exposes its dependency scopes as
//! ordered (name, range) pairs. Declaration order inside a scope is preserved
//! so the engine queues modules in manifest order. Every load reads the file
//! fresh; nothing is cached between checks.

use crate::error::CheckError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Manifest file name looked up at the project root
pub const MANIFEST_FILE: &str = "package.json";

/// Scope lookup order used by the on-demand resolver
pub const LOOKUP_SCOPES: [&str; 3] = ["dependencies", "devDependencies", "optionalDependencies"];

/// A loaded manifest document
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: Map<String, Value>,
}

impl Manifest {
    /// Loads the manifest at the given project root
    pub async fn load(project: &Path) -> Result<Self, CheckError> {
        let path = project.join(MANIFEST_FILE);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|_| CheckError::manifest_missing(&path))?;
        Self::parse(path, &content)
    }

    /// Loads the manifest without an async runtime, for the on-demand resolver
    pub fn load_blocking(project: &Path) -> Result<Self, CheckError> {
        let path = project.join(MANIFEST_FILE);
        let content =
            std::fs::read_to_string(&path).map_err(|_| CheckError::manifest_missing(&path))?;
        Self::parse(path, &content)
    }

    fn parse(path: PathBuf, content: &str) -> Result<Self, CheckError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| CheckError::manifest_invalid(&path, e.to_string()))?;

        match value {
            Value::Object(document) => Ok(Self { path, document }),
            _ => Err(CheckError::manifest_invalid(&path, "not a JSON object")),
        }
    }

    /// The path of the loaded manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the named scope is declared in the manifest
    pub fn has_scope(&self, scope: &str) -> bool {
        self.document
            .get(scope)
            .map(Value::is_object)
            .unwrap_or(false)
    }

    /// Returns the declarations of one scope as ordered (name, range) pairs
    ///
    /// Entries whose range is not a string are skipped. Returns `None` when
    /// the scope is absent from the manifest.
    pub fn scope(&self, scope: &str) -> Option<Vec<(String, String)>> {
        let entries = self.document.get(scope)?.as_object()?;

        Some(
            entries
                .iter()
                .filter_map(|(name, range)| {
                    range.as_str().map(|r| (name.clone(), r.to_string()))
                })
                .collect(),
        )
    }

    /// Looks up one package's declared range across the given scopes in order
    pub fn lookup(&self, name: &str, scopes: &[&str]) -> Option<String> {
        scopes.iter().find_map(|scope| {
            self.document
                .get(*scope)?
                .get(name)?
                .as_str()
                .map(str::to_string)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, content: &str) {
        fs::write(dir.path().join(MANIFEST_FILE), content).unwrap();
    }

    #[test]
    fn test_load_blocking_missing() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::load_blocking(dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "No package.json");
    }

    #[test]
    fn test_load_blocking_invalid_json() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir, "{not json");
        let err = Manifest::load_blocking(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse package.json"));
    }

    #[test]
    fn test_load_blocking_non_object() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir, "[1, 2, 3]");
        let err = Manifest::load_blocking(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn test_scope_preserves_declaration_order() {
        let dir = TempDir::new().unwrap();
        write_manifest(
            &dir,
            r#"{"devDependencies": {"zeta": "^1.0.0", "alpha": "^2.0.0", "mid": "~0.3.0"}}"#,
        );

        let manifest = Manifest::load_blocking(dir.path()).unwrap();
        let deps = manifest.scope("devDependencies").unwrap();
        let names: Vec<&str> = deps.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_scope_absent() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir, r#"{"dependencies": {}}"#);

        let manifest = Manifest::load_blocking(dir.path()).unwrap();
        assert!(manifest.scope("devDependencies").is_none());
        assert!(!manifest.has_scope("devDependencies"));
        assert!(manifest.has_scope("dependencies"));
    }

    #[test]
    fn test_scope_skips_non_string_ranges() {
        let dir = TempDir::new().unwrap();
        write_manifest(
            &dir,
            r#"{"dependencies": {"blame": "^1.0.0", "weird": {"git": "x"}}}"#,
        );

        let manifest = Manifest::load_blocking(dir.path()).unwrap();
        let deps = manifest.scope("dependencies").unwrap();
        assert_eq!(deps, vec![("blame".to_string(), "^1.0.0".to_string())]);
    }

    #[test]
    fn test_lookup_precedence() {
        let dir = TempDir::new().unwrap();
        write_manifest(
            &dir,
            r#"{
                "dependencies": {"both": "^1.0.0"},
                "devDependencies": {"both": "^2.0.0", "dev-only": "~3.0.0"},
                "optionalDependencies": {"opt-only": "*"}
            }"#,
        );

        let manifest = Manifest::load_blocking(dir.path()).unwrap();
        assert_eq!(
            manifest.lookup("both", &LOOKUP_SCOPES).as_deref(),
            Some("^1.0.0")
        );
        assert_eq!(
            manifest.lookup("dev-only", &LOOKUP_SCOPES).as_deref(),
            Some("~3.0.0")
        );
        assert_eq!(
            manifest.lookup("opt-only", &LOOKUP_SCOPES).as_deref(),
            Some("*")
        );
        assert!(manifest.lookup("absent", &LOOKUP_SCOPES).is_none());
    }

    #[tokio::test]
    async fn test_load_async() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir, r#"{"devDependencies": {"blame": "^1.0.0"}}"#);

        let manifest = Manifest::load(dir.path()).await.unwrap();
        assert!(manifest.has_scope("devDependencies"));
        assert_eq!(manifest.path(), dir.path().join(MANIFEST_FILE));
    }
}
