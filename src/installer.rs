//! Install mechanism integration
//!
//! This module provides:
//! - The InstallRunner trait abstracting the external install mechanism
//! - NpmInstaller, spawning `npm install <name>@<range>` in the project root
//!
//! Two invocation modes exist. The asynchronous mode is used by batch runs
//! and judged by exit status. The blocking mode serves the on-demand
//! resolver, which judges the captured diagnostics for an error signature.

use async_trait::async_trait;
use std::path::Path;
use std::process::Output;

/// Error signature scanned for in blocking-mode diagnostics
pub const ERROR_SIGNATURE: &str = "ERR!";

/// Captured result of one install invocation
#[derive(Debug, Clone)]
pub struct InstallOutput {
    /// The command that was executed
    pub command: String,
    /// Whether the process exited successfully
    pub success: bool,
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl InstallOutput {
    fn from_output(command: String, output: Output) -> Self {
        Self {
            command,
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    fn spawn_failure(command: String, error: std::io::Error) -> Self {
        Self {
            command,
            success: false,
            stdout: String::new(),
            stderr: error.to_string(),
        }
    }

    /// Returns true if the diagnostics carry the error signature
    pub fn has_error_diagnostics(&self) -> bool {
        self.stderr.lines().any(|line| line.contains(ERROR_SIGNATURE))
    }
}

/// External installation mechanism for one `name@range` package spec
#[async_trait]
pub trait InstallRunner: Send + Sync {
    /// Installs one package, suspending until the subprocess exits
    async fn install(&self, package: &str, project: &Path) -> InstallOutput;

    /// Installs one package, blocking the calling thread
    fn install_blocking(&self, package: &str, project: &Path) -> InstallOutput;
}

/// Install runner spawning the npm command line
#[derive(Debug, Clone)]
pub struct NpmInstaller {
    program: String,
}

impl NpmInstaller {
    /// Creates an installer invoking `npm`
    pub fn new() -> Self {
        Self::with_program("npm")
    }

    /// Creates an installer invoking a different program with npm-style
    /// arguments
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command_line(&self, package: &str) -> String {
        format!("{} install {}", self.program, package)
    }
}

impl Default for NpmInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstallRunner for NpmInstaller {
    async fn install(&self, package: &str, project: &Path) -> InstallOutput {
        let command = self.command_line(package);
        let result = tokio::process::Command::new(&self.program)
            .args(["install", package])
            .current_dir(project)
            .output()
            .await;

        match result {
            Ok(output) => InstallOutput::from_output(command, output),
            Err(e) => InstallOutput::spawn_failure(command, e),
        }
    }

    fn install_blocking(&self, package: &str, project: &Path) -> InstallOutput {
        let command = self.command_line(package);
        let result = std::process::Command::new(&self.program)
            .args(["install", package])
            .current_dir(project)
            .output();

        match result {
            Ok(output) => InstallOutput::from_output(command, output),
            Err(e) => InstallOutput::spawn_failure(command, e),
        }
    }
}
