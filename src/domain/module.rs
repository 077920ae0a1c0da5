//! Module check records and lifecycle states

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

/// Valid module name pattern, checked before any install attempt
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").unwrap());

/// Returns true if the name is a valid module identifier
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Lifecycle state of one module under evaluation
///
/// States are monotonic: a module starts `Pending` and moves to exactly one
/// of the terminal states, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleState {
    /// Not yet classified
    Pending,
    /// Installed version satisfies the declared range
    Current,
    /// The install decision was rejected
    Skipped,
    /// Installed successfully during this run
    Installed,
    /// Validation or installation failed
    Failed,
}

impl ModuleState {
    /// Returns true for the four terminal states
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ModuleState::Pending)
    }

    /// Returns true if this state leaves the module without a usable install
    pub fn needs_install(&self) -> bool {
        matches!(self, ModuleState::Skipped | ModuleState::Failed)
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModuleState::Pending => "pending",
            ModuleState::Current => "current",
            ModuleState::Skipped => "skipped",
            ModuleState::Installed => "installed",
            ModuleState::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// Classification of the action a needs-action module requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleAction {
    /// Nothing is installed yet
    Install,
    /// Something is installed but does not satisfy the range
    Update,
}

impl fmt::Display for ModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModuleAction::Install => "install",
            ModuleAction::Update => "update",
        };
        write!(f, "{}", label)
    }
}

/// One declared dependency under evaluation
#[derive(Debug, Clone)]
pub struct ModuleCheck {
    /// Package identifier
    pub name: String,
    /// Declared version constraint, consumed only by the version oracle
    pub range: String,
    /// Manifest section the declaration came from
    pub scope: String,
    /// Set once the prober finds an existing install
    pub installed_version: Option<String>,
    /// True when installed but not satisfying the range
    pub needs_upgrade: bool,
    /// Lifecycle state
    pub state: ModuleState,
    /// Wall-clock install time, set only on successful install
    pub install_duration: Option<Duration>,
}

impl ModuleCheck {
    /// Creates a new pending module check
    pub fn new(name: impl Into<String>, range: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
            scope: scope.into(),
            installed_version: None,
            needs_upgrade: false,
            state: ModuleState::Pending,
            install_duration: None,
        }
    }

    /// The action this module requires if it is not current
    pub fn action(&self) -> ModuleAction {
        if self.needs_upgrade {
            ModuleAction::Update
        } else {
            ModuleAction::Install
        }
    }

    /// Moves the module into a terminal state
    ///
    /// A module reaches exactly one terminal state; transitioning twice is a
    /// logic error in the engine.
    pub fn finish(&mut self, state: ModuleState) {
        debug_assert_eq!(self.state, ModuleState::Pending, "state is monotonic");
        debug_assert!(state.is_terminal());
        self.state = state;
    }

    /// The `name@range` package spec handed to the installer
    pub fn package_spec(&self) -> String {
        format!("{}@{}", self.name, self.range)
    }
}

impl fmt::Display for ModuleCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} [{}] {}", self.name, self.range, self.scope, self.state)
    }
}
