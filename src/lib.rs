//! depgate - dependency check and gated install library
//!
//! Inspects a project's package.json, determines which declared packages are
//! missing or out of date relative to what is installed under node_modules,
//! gates every install behind an accept/reject decision, and reports a
//! consolidated result or escalates an error. A synchronous on-demand
//! resolver covers the single-module, install-if-missing case.

pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod gate;
pub mod installer;
pub mod manifest;
pub mod ondemand;
pub mod output;
pub mod probe;
pub mod progress;
pub mod resolver;
pub mod version;
