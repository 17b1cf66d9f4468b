//! sbtm-search - find session sheets containing some text
//!
//! Matching sheets are concatenated into `search_results_sheets.txt` in the
//! output directory, each under a banner naming the sheet.

use anyhow::{Context, Result};
use clap::Parser;
use sbtm_core::config::LoggingConfig;
use sbtm_core::search::{search_sheets, write_search_results};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sbtm-search")]
#[command(about = "Search session sheets for some text")]
#[command(version)]
struct Args {
    /// Directory containing the session sheets
    scan_dir: PathBuf,

    /// Text to search for (case-insensitive)
    query: String,

    /// Where to write the results (default: current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = sbtm_core::logging::init(&LoggingConfig::default(), "sbtm-search")
        .context("failed to initialize logging")?;

    let output_dir = match args.output {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    if !output_dir.is_dir() {
        anyhow::bail!(
            "Output location '{}' is not a valid directory!",
            output_dir.display()
        );
    }

    let query = args.query.trim();
    if query.is_empty() {
        return Ok(());
    }

    let outcome = search_sheets(&args.scan_dir, query)
        .with_context(|| format!("failed to search {}", args.scan_dir.display()))?;

    if outcome.sheets_searched == 0 {
        println!("No session sheets found in the target folder specified.");
    } else {
        let results = write_search_results(&output_dir, &outcome.hits)
            .context("failed to write search results")?;
        for hit in &outcome.hits {
            println!("{}", hit.path.display());
        }
        if !outcome.hits.is_empty() {
            println!(
                "\nOpen '{}' to view the contents of all the matching files together.",
                results.display()
            );
        }
    }

    println!(
        "\n{} file(s) were found that matched your search.",
        outcome.hits.len()
    );
    Ok(())
}
