//! sbtm-recent - show the most recent days of session progress
//!
//! Reads `breakdowns-day.txt` from the metrics directory written by the
//! last `sbtm-scan` run.

mod common;

use anyhow::{Context, Result};
use clap::Parser;
use sbtm_core::outputs::BREAKDOWNS_DAY;
use sbtm_core::summary::{days_to_json, parse_day_count, recent_days, render_days};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sbtm-recent")]
#[command(about = "Show the most recent days of session progress")]
#[command(version)]
struct Args {
    /// Number of days to show (default 1)
    days: Option<String>,

    /// Directory holding sbtm.toml
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    format: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = common::load_settings(args.config_dir)?;
    let _log_guard = sbtm_core::logging::init(&settings.config.logging, "sbtm-recent")
        .context("failed to initialize logging")?;

    let requested = parse_day_count(args.days.as_deref());
    let metrics_dir = &settings.config.folders.metrics_dir;
    let days = recent_days(metrics_dir, requested)
        .with_context(|| format!("Can't find '{}' file in {}", BREAKDOWNS_DAY, metrics_dir.display()))?;

    if args.format == "json" {
        println!("{}", days_to_json(&days)?);
    } else {
        println!("{}", render_days(&days, requested, chrono::Local::now()));
    }
    Ok(())
}
