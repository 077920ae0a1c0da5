//! CLI argument parsing module for depgate

use crate::engine::{CheckOptions, DEFAULT_SCOPE};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Dependency check and gated install tool
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depgate",
    version,
    about = "Check declared dependencies against what is installed and install what is missing"
)]
pub struct CliArgs {
    /// Project root containing package.json (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Manifest scope to check (can be specified multiple times; default: devDependencies)
    #[arg(long, action = ArgAction::Append)]
    pub scope: Vec<String>,

    /// Automatically accept every needed install
    #[arg(long)]
    pub auto: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose output - report each module as it is processed
    #[arg(long)]
    pub verbose: bool,

    /// Output the final report in JSON format
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// The scopes to check, in requested order
    pub fn scopes(&self) -> Vec<String> {
        if self.scope.is_empty() {
            vec![DEFAULT_SCOPE.to_string()]
        } else {
            self.scope.clone()
        }
    }

    /// Builds engine options from the parsed arguments
    pub fn to_options(&self) -> CheckOptions {
        CheckOptions::new()
            .with_path(self.path.clone())
            .with_scopes(self.scopes())
            .with_auto_accept(self.auto)
    }
}
