//! Application error types using thiserror
//!
//! Error hierarchy:
//! - CheckError: fatal conditions raised by a batch check run
//! - GateError: decision capability misuse
//! - ResolveError: failures of the on-demand resolver
//!
//! Every CheckError is routed through a single chokepoint in the engine:
//! delivered as an `error` event when a listener is registered, returned as
//! `Err` to the caller otherwise.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions for a batch check run
#[derive(Error, Debug)]
pub enum CheckError {
    /// No manifest file at the project root
    #[error("No package.json")]
    ManifestMissing { path: PathBuf },

    /// The manifest exists but is not valid JSON
    #[error("Failed to parse package.json: {message}")]
    ManifestInvalid { path: PathBuf, message: String },

    /// A requested scope is not declared in the manifest
    #[error("Scope not found: {scope}")]
    ScopeNotFound { scope: String },

    /// A declared module name fails the identifier pattern check
    #[error("Invalid module name: {name}")]
    InvalidName { name: String },

    /// The external install mechanism exited non-zero
    #[error("Failed to install: {name}")]
    InstallFailed { name: String },

    /// One or more modules ended the run without being installed
    #[error("Update needed: {}", names.join(", "))]
    UpdateNeeded { names: Vec<String> },
}

/// Decision capability misuse
#[derive(Error, Debug)]
pub enum GateError {
    /// The capability was already resolved once
    #[error("decision for '{name}' was already resolved")]
    AlreadyDecided { name: String },

    /// The run that issued the capability has already finished
    #[error("the run that requested a decision for '{name}' has ended")]
    RunEnded { name: String },
}

/// Failures of the on-demand resolver, always raised directly to the caller
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The requested name fails the identifier pattern check
    #[error("Invalid module name: {name}")]
    InvalidName { name: String },

    /// The install mechanism reported error diagnostics, or the module is
    /// still unresolvable after installing
    #[error("Failed to install: {name}")]
    InstallFailed { name: String },
}

impl CheckError {
    /// Creates a new ManifestMissing error
    pub fn manifest_missing(path: impl Into<PathBuf>) -> Self {
        CheckError::ManifestMissing { path: path.into() }
    }

    /// Creates a new ManifestInvalid error
    pub fn manifest_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CheckError::ManifestInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new ScopeNotFound error
    pub fn scope_not_found(scope: impl Into<String>) -> Self {
        CheckError::ScopeNotFound {
            scope: scope.into(),
        }
    }

    /// Creates a new InvalidName error
    pub fn invalid_name(name: impl Into<String>) -> Self {
        CheckError::InvalidName { name: name.into() }
    }

    /// Creates a new InstallFailed error
    pub fn install_failed(name: impl Into<String>) -> Self {
        CheckError::InstallFailed { name: name.into() }
    }

    /// Creates a new UpdateNeeded error from the modules left uninstalled
    pub fn update_needed(names: Vec<String>) -> Self {
        CheckError::UpdateNeeded { names }
    }
}

impl GateError {
    /// Creates a new AlreadyDecided error
    pub fn already_decided(name: impl Into<String>) -> Self {
        GateError::AlreadyDecided { name: name.into() }
    }

    /// Creates a new RunEnded error
    pub fn run_ended(name: impl Into<String>) -> Self {
        GateError::RunEnded { name: name.into() }
    }
}

impl ResolveError {
    /// Creates a new InvalidName error
    pub fn invalid_name(name: impl Into<String>) -> Self {
        ResolveError::InvalidName { name: name.into() }
    }

    /// Creates a new InstallFailed error
    pub fn install_failed(name: impl Into<String>) -> Self {
        ResolveError::InstallFailed { name: name.into() }
    }
}
