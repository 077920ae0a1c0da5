//! depgate - dependency check and gated install CLI
//!
//! Checks the declared dependencies of a package.json project against what is
//! installed and, with --auto, installs whatever is missing or out of date.

use clap::Parser;
use depgate::cli::CliArgs;
use depgate::engine::Checker;
use depgate::error::CheckError;
use depgate::events::{Event, EventKind};
use depgate::output::ReportPrinter;
use depgate::progress::Progress;
use std::io::{self, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("depgate v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.path.display());
        eprintln!("Scopes: {}", args.scopes().join(", "));
    }

    let mut checker = Checker::new(args.to_options());

    if args.verbose {
        checker.on(EventKind::Current, |event| {
            if let Event::Current(report) = event {
                eprintln!("  up to date {}@{}", report.name, report.range);
            }
        });
        checker.on(EventKind::Complete, |event| {
            if let Event::Complete(report) = event {
                eprintln!(
                    "  installed {}@{} in {}ms",
                    report.name,
                    report.range,
                    report.install_duration_ms.unwrap_or(0)
                );
            }
        });
    }

    let mut progress = Progress::new(!args.quiet && !args.json && !args.verbose);
    progress.spinner("Checking dependencies...");
    let result = checker.check().await;
    progress.finish_and_clear();

    let printer = ReportPrinter::new(args.json, args.quiet);
    let mut stdout = io::stdout().lock();

    match result {
        Ok(report) => {
            printer.print(&report, &mut stdout)?;
            stdout.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ CheckError::UpdateNeeded { .. }) => {
            eprintln!("{}", err);
            if !args.auto {
                printer.print_update_hint(&mut stdout)?;
                stdout.flush()?;
            }
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}
