//! Shallow report projections handed to embedding callers

use super::{ModuleCheck, ModuleState};
use serde::Serialize;

/// Read-only projection of one processed module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleReport {
    /// Package identifier
    pub name: String,
    /// Manifest section the declaration came from
    pub scope: String,
    /// Declared version constraint
    pub range: String,
    /// Installed version, when the prober found one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_version: Option<String>,
    /// Final lifecycle state
    pub state: ModuleState,
    /// Install wall-clock time in milliseconds, set only on successful install
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_duration_ms: Option<u128>,
}

impl From<&ModuleCheck> for ModuleReport {
    fn from(module: &ModuleCheck) -> Self {
        Self {
            name: module.name.clone(),
            scope: module.scope.clone(),
            range: module.range.clone(),
            installed_version: module.installed_version.clone(),
            state: module.state,
            install_duration_ms: module.install_duration.map(|d| d.as_millis()),
        }
    }
}

/// Terminal report of one batch check run
///
/// Contains every processed module in completion order. Completion order is
/// not stable across runs; callers must not depend on result ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// All processed module projections
    pub modules: Vec<ModuleReport>,
}

impl RunReport {
    /// Creates a report from processed module projections
    pub fn new(modules: Vec<ModuleReport>) -> Self {
        Self { modules }
    }

    /// Number of processed modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True when no module was processed
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Number of modules that ended in the given state
    pub fn count_in(&self, state: ModuleState) -> usize {
        self.modules.iter().filter(|m| m.state == state).count()
    }

    /// Names of modules that ended in the given state, in report order
    pub fn names_in(&self, state: ModuleState) -> Vec<&str> {
        self.modules
            .iter()
            .filter(|m| m.state == state)
            .map(|m| m.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_module() -> ModuleCheck {
        let mut module = ModuleCheck::new("blame", "^1.0.0", "devDependencies");
        module.installed_version = Some("1.1.2".to_string());
        module.finish(ModuleState::Current);
        module
    }

    #[test]
    fn test_report_from_module() {
        let report = ModuleReport::from(&sample_module());
        assert_eq!(report.name, "blame");
        assert_eq!(report.scope, "devDependencies");
        assert_eq!(report.range, "^1.0.0");
        assert_eq!(report.installed_version.as_deref(), Some("1.1.2"));
        assert_eq!(report.state, ModuleState::Current);
        assert!(report.install_duration_ms.is_none());
    }

    #[test]
    fn test_report_carries_duration() {
        let mut module = ModuleCheck::new("blame", "^1.0.0", "devDependencies");
        module.install_duration = Some(Duration::from_millis(420));
        module.finish(ModuleState::Installed);

        let report = ModuleReport::from(&module);
        assert_eq!(report.install_duration_ms, Some(420));
    }

    #[test]
    fn test_run_report_counts() {
        let mut skipped = ModuleCheck::new("left-pad", "^2.0.0", "dependencies");
        skipped.finish(ModuleState::Skipped);

        let report = RunReport::new(vec![
            ModuleReport::from(&sample_module()),
            ModuleReport::from(&skipped),
        ]);

        assert_eq!(report.len(), 2);
        assert_eq!(report.count_in(ModuleState::Current), 1);
        assert_eq!(report.count_in(ModuleState::Skipped), 1);
        assert_eq!(report.count_in(ModuleState::Installed), 0);
        assert_eq!(report.names_in(ModuleState::Skipped), vec!["left-pad"]);
    }

    #[test]
    fn test_run_report_default_is_empty() {
        let report = RunReport::default();
        assert!(report.is_empty());
    }

    #[test]
    fn test_report_serializes_state_lowercase() {
        let json = serde_json::to_string(&ModuleReport::from(&sample_module())).unwrap();
        assert!(json.contains("\"state\":\"current\""));
        assert!(json.contains("\"installed_version\":\"1.1.2\""));
        // duration is omitted when absent
        assert!(!json.contains("install_duration_ms"));
    }
}
