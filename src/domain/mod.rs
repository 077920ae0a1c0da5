//! Core domain models for depgate
//!
//! This module contains the fundamental types used throughout the application:
//! - Module check records and their lifecycle states
//! - The install/update action classification
//! - Shallow report projections handed to embedding callers

mod module;
mod report;

pub use module::{is_valid_name, ModuleAction, ModuleCheck, ModuleState};
pub use report::{ModuleReport, RunReport};
