//! sbtm-scan - validate session sheets and build the metrics tables
//!
//! Reads every `.ses` sheet in a directory, reports problems in them, and
//! writes the tab-separated tables the report pages are built from.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/sbtm/sbtm.toml (~/.config/sbtm/sbtm.toml)
//! - Logs: $XDG_STATE_HOME/sbtm/sbtm.log (~/.local/state/sbtm/sbtm.log)

mod common;

use anyhow::{Context, Result};
use clap::Parser;
use sbtm_core::config::{LogDestination, CONFIG_FILE_NAME};
use sbtm_core::{Config, DiagnosticSink, Scanner};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sbtm-scan")]
#[command(about = "Validate session sheets and build the metrics tables")]
#[command(version)]
struct Args {
    /// Directory containing the session sheets
    scan_dir: PathBuf,

    /// Directory holding sbtm.toml and the allow-lists
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Output format for the run summary: none (default) or json
    #[arg(short, long, default_value = "none")]
    format: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = common::load_settings(args.config_dir)?;

    // Initialize logging
    let _log_guard = sbtm_core::logging::init(&settings.config.logging, "sbtm-scan")
        .context("failed to initialize logging")?;

    tracing::info!(scan_dir = %args.scan_dir.display(), "Scanning");

    if !args.scan_dir.is_dir() {
        anyhow::bail!("'{}' is not a valid directory", args.scan_dir.display());
    }

    let mut sink = diagnostic_sink(&settings.config)?;
    let scanner = Scanner::new(settings.config, settings.config_dir);
    let report = scanner
        .scan(&args.scan_dir, &mut sink)
        .context("scan aborted")?;

    if args.format == "json" {
        println!("{}", report.to_json()?);
    }

    // Sheet errors are reported in the output, not through the exit code.
    tracing::info!(errors_found = report.errors_found, "sbtm-scan finished");
    Ok(())
}

/// Open the diagnostics destination named by `output.logfile`.
fn diagnostic_sink(config: &Config) -> Result<DiagnosticSink> {
    let warnings = config.scan_options.warnings;
    let sink = match config.output.destination() {
        LogDestination::Console => DiagnosticSink::console(warnings),
        LogDestination::File(path) => DiagnosticSink::to_file(&path, warnings)
            .with_context(|| format!("failed to open log file {}", path.display()))?,
        LogDestination::Invalid(name) => {
            tracing::warn!(logfile = %name, "invalid log file name, using the console");
            println!(
                "!! Invalid filename specified for the logfile in {}.  Outputting to console...",
                CONFIG_FILE_NAME
            );
            DiagnosticSink::console(warnings)
        }
    };
    Ok(sink)
}
