//! On-demand resolver: resolve one named module, installing it if needed
//!
//! The synchronous counterpart of the batch check, for callers that need an
//! import-time guarantee. It never touches the event channel or the decision
//! gate; installs are accepted by construction and failures are raised
//! directly to the caller.

use crate::domain::is_valid_name;
use crate::error::ResolveError;
use crate::installer::InstallRunner;
use crate::manifest::{Manifest, LOOKUP_SCOPES};
use crate::probe;
use crate::version;
use std::path::PathBuf;

/// Range used when no version is given and none is declared anywhere
pub const UNCONSTRAINED_RANGE: &str = "*";

/// Descriptor of one module to resolve
#[derive(Debug, Clone)]
pub struct ModuleSpec {
    /// Package identifier
    pub name: String,
    /// Version or range; looked up from the manifest when absent
    pub version: Option<String>,
    /// Project root to search; defaults to the current directory
    pub path: Option<PathBuf>,
}

impl ModuleSpec {
    /// Creates a spec resolving whatever version is declared or installed
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            path: None,
        }
    }

    /// Requests a specific version or range
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Searches a specific project root
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl From<&str> for ModuleSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ModuleSpec {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// A successfully resolved module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Package identifier
    pub name: String,
    /// The version found installed
    pub version: String,
    /// Install location of the module
    pub dir: PathBuf,
}

/// Resolves one module, installing it synchronously when it is missing or
/// does not satisfy the requested version
pub fn resolve(spec: ModuleSpec, runner: &dyn InstallRunner) -> Result<ResolvedModule, ResolveError> {
    if !is_valid_name(&spec.name) {
        return Err(ResolveError::invalid_name(&spec.name));
    }

    let project = spec.path.unwrap_or_else(|| PathBuf::from("."));

    // an explicitly requested version always wins; otherwise the nearest
    // manifest's declarations are consulted in scope precedence order
    let declared = spec.version.or_else(|| {
        Manifest::load_blocking(&project)
            .ok()
            .and_then(|manifest| manifest.lookup(&spec.name, &LOOKUP_SCOPES))
    });

    if let Some(installed) = probe::installed_version_blocking(&project, &spec.name) {
        let satisfied = match &declared {
            Some(range) => version::satisfies(&installed, range),
            None => true,
        };
        if satisfied {
            return Ok(ResolvedModule {
                dir: probe::module_dir(&project, &spec.name),
                name: spec.name,
                version: installed,
            });
        }
    }

    let range = declared.unwrap_or_else(|| UNCONSTRAINED_RANGE.to_string());
    let output = runner.install_blocking(&format!("{}@{}", spec.name, range), &project);
    if !output.success || output.has_error_diagnostics() {
        return Err(ResolveError::install_failed(&spec.name));
    }

    match probe::installed_version_blocking(&project, &spec.name) {
        Some(installed) => Ok(ResolvedModule {
            dir: probe::module_dir(&project, &spec.name),
            name: spec.name,
            version: installed,
        }),
        None => Err(ResolveError::install_failed(&spec.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::InstallOutput;
    use async_trait::async_trait;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Runner that simulates an install by writing the module descriptor
    struct FakeInstall {
        version: Option<String>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeInstall {
        fn succeeding(version: &str) -> Self {
            Self {
                version: Some(version.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                version: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn run(&self, package: &str, project: &Path) -> InstallOutput {
            self.requests.lock().unwrap().push(package.to_string());

            match &self.version {
                Some(version) => {
                    let name = package.split('@').next().unwrap();
                    let dir = project.join("node_modules").join(name);
                    fs::create_dir_all(&dir).unwrap();
                    fs::write(
                        dir.join("package.json"),
                        format!(r#"{{"name": "{}", "version": "{}"}}"#, name, version),
                    )
                    .unwrap();
                    InstallOutput {
                        command: format!("mock install {}", package),
                        success: true,
                        stdout: String::new(),
                        stderr: String::new(),
                    }
                }
                None => InstallOutput {
                    command: format!("mock install {}", package),
                    success: true,
                    stdout: String::new(),
                    stderr: "npm ERR! code E404\nnpm ERR! 404 Not Found".to_string(),
                },
            }
        }
    }

    #[async_trait]
    impl InstallRunner for FakeInstall {
        async fn install(&self, package: &str, project: &Path) -> InstallOutput {
            self.run(package, project)
        }

        fn install_blocking(&self, package: &str, project: &Path) -> InstallOutput {
            self.run(package, project)
        }
    }

    fn install_fixture(project: &Path, name: &str, version: &str) {
        let dir = project.join("node_modules").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(r#"{{"version": "{}"}}"#, version),
        )
        .unwrap();
    }

    #[test]
    fn test_already_resolvable_without_version() {
        let dir = TempDir::new().unwrap();
        install_fixture(dir.path(), "blame", "1.1.2");

        let runner = FakeInstall::failing();
        let spec = ModuleSpec::new("blame").with_path(dir.path());
        let resolved = resolve(spec, &runner).unwrap();

        assert_eq!(resolved.name, "blame");
        assert_eq!(resolved.version, "1.1.2");
        assert_eq!(resolved.dir, dir.path().join("node_modules/blame"));
        // no install was attempted
        assert!(runner.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_installs_missing_module() {
        let dir = TempDir::new().unwrap();

        let runner = FakeInstall::succeeding("1.2.0");
        let spec = ModuleSpec::new("blame").with_path(dir.path());
        let resolved = resolve(spec, &runner).unwrap();

        assert_eq!(resolved.version, "1.2.0");
        assert_eq!(*runner.requests.lock().unwrap(), vec!["blame@*"]);
    }

    #[test]
    fn test_reinstalls_on_version_mismatch() {
        let dir = TempDir::new().unwrap();
        install_fixture(dir.path(), "blame", "1.1.2");

        let runner = FakeInstall::succeeding("1.0.0");
        let spec = ModuleSpec::new("blame")
            .with_version("1.0.0")
            .with_path(dir.path());
        let resolved = resolve(spec, &runner).unwrap();

        assert_eq!(resolved.version, "1.0.0");
        assert_eq!(*runner.requests.lock().unwrap(), vec!["blame@1.0.0"]);
    }

    #[test]
    fn test_matching_semver_range_skips_install() {
        let dir = TempDir::new().unwrap();
        install_fixture(dir.path(), "blame", "1.0.0");

        let runner = FakeInstall::failing();
        let spec = ModuleSpec::new("blame")
            .with_version("^1.0.0")
            .with_path(dir.path());
        let resolved = resolve(spec, &runner).unwrap();

        assert_eq!(resolved.version, "1.0.0");
        assert!(runner.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_version_from_manifest_precedence() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
                "dependencies": {"blame": "^2.0.0"},
                "devDependencies": {"blame": "^1.0.0"}
            }"#,
        )
        .unwrap();
        install_fixture(dir.path(), "blame", "1.0.0");

        // dependencies wins over devDependencies, so 1.0.0 no longer fits
        let runner = FakeInstall::succeeding("2.1.0");
        let spec = ModuleSpec::new("blame").with_path(dir.path());
        let resolved = resolve(spec, &runner).unwrap();

        assert_eq!(resolved.version, "2.1.0");
        assert_eq!(*runner.requests.lock().unwrap(), vec!["blame@^2.0.0"]);
    }

    #[test]
    fn test_failed_install_raises() {
        let dir = TempDir::new().unwrap();

        let runner = FakeInstall::failing();
        let spec = ModuleSpec::new("blame").with_path(dir.path());
        let err = resolve(spec, &runner).unwrap_err();

        assert_eq!(err.to_string(), "Failed to install: blame");
    }

    #[test]
    fn test_install_that_leaves_nothing_raises() {
        let dir = TempDir::new().unwrap();

        // reports success but writes no module
        struct NoopInstall;

        #[async_trait]
        impl InstallRunner for NoopInstall {
            async fn install(&self, package: &str, project: &Path) -> InstallOutput {
                self.install_blocking(package, project)
            }

            fn install_blocking(&self, package: &str, _project: &Path) -> InstallOutput {
                InstallOutput {
                    command: format!("mock install {}", package),
                    success: true,
                    stdout: String::new(),
                    stderr: String::new(),
                }
            }
        }

        let spec = ModuleSpec::new("blame").with_path(dir.path());
        let err = resolve(spec, &NoopInstall).unwrap_err();
        assert_eq!(err.to_string(), "Failed to install: blame");
    }

    #[test]
    fn test_invalid_name_rejected_before_install() {
        let runner = FakeInstall::succeeding("1.0.0");
        let err = resolve(ModuleSpec::new("Not Valid"), &runner).unwrap_err();

        assert_eq!(err.to_string(), "Invalid module name: Not Valid");
        assert!(runner.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_spec_from_name() {
        let spec: ModuleSpec = "blame".into();
        assert_eq!(spec.name, "blame");
        assert!(spec.version.is_none());
        assert!(spec.path.is_none());
    }
}
