//! Report formatting for the command line
//!
//! Groups the terminal report by final module state, one line per state with
//! counts and names, plus a hint when modules were left uninstalled.

use crate::domain::{ModuleState, RunReport};
use colored::{Color, Colorize};
use std::io::{self, Write};

/// States listed in the grouped report, in display order
const REPORT_STATES: [ModuleState; 4] = [
    ModuleState::Current,
    ModuleState::Installed,
    ModuleState::Skipped,
    ModuleState::Failed,
];

/// Formatter for the terminal report
pub struct ReportPrinter {
    json: bool,
    quiet: bool,
}

impl ReportPrinter {
    /// Creates a printer from output flags
    pub fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    /// Writes the report
    pub fn print(&self, report: &RunReport, out: &mut impl Write) -> io::Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
            return Ok(());
        }

        if self.quiet {
            return Ok(());
        }

        writeln!(out, "Checked {} modules", report.len())?;
        for state in REPORT_STATES {
            let names = report.names_in(state);
            if names.is_empty() {
                continue;
            }

            let (label, color) = match state {
                ModuleState::Current => ("up to date", Color::Green),
                ModuleState::Installed => ("installed", Color::Cyan),
                ModuleState::Skipped => ("skipped", Color::Yellow),
                ModuleState::Failed => ("failed", Color::Red),
                ModuleState::Pending => unreachable!("report contains only terminal states"),
            };
            // pad before styling so escape bytes never count toward the column
            let label = format!("{:>10}", label).color(color);
            writeln!(out, "  {}: {} ({})", label, names.len(), names.join(", "))?;
        }

        Ok(())
    }

    /// Writes the escalation hint shown when the run ends in `Update needed`
    pub fn print_update_hint(&self, out: &mut impl Write) -> io::Result<()> {
        if self.json || self.quiet {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "There are modules in need of an install, run again with:")?;
        writeln!(out, "  depgate --auto")?;
        Ok(())
    }
}
