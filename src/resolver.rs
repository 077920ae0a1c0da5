//! Module state resolver
//!
//! Classifies one module from the prober and version oracle results. This is
//! a pure function with no side effects; the engine applies the outcome.

use crate::domain::ModuleAction;
use crate::version;

/// Classification of a pending module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Installed and satisfying its range; no action needed
    Current,
    /// Missing or out of date; a gated action is required
    NeedsAction(ModuleAction),
}

/// Classifies a module from its probed install state and declared range
pub fn resolve_state(installed: Option<&str>, range: &str) -> Resolution {
    match installed {
        Some(version) if version::satisfies(version, range) => Resolution::Current,
        Some(_) => Resolution::NeedsAction(ModuleAction::Update),
        None => Resolution::NeedsAction(ModuleAction::Install),
    }
}
