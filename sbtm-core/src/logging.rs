//! Tracing setup shared by the sbtm tools
//!
//! Every tool appends to one daily-rolling file, `$XDG_STATE_HOME/sbtm/sbtm.log`
//! (~/.local/state/sbtm/). Each run opens a `run` span carrying the tool name,
//! so lines from `sbtm-scan`, `sbtm-search` and `sbtm-recent` can be told
//! apart in the shared file.
//!
//! Scan diagnostics are not logs; they go through
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink).

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "sbtm.log";

/// Third-party crates only log at warn or above unless `RUST_LOG` says otherwise.
const QUIET_DEPENDENCIES: &[&str] = &["glob=warn"];

/// Build the filter: `RUST_LOG` wins, then `[logging] level`.
fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let mut directives = vec![level.trim().to_string()];
    directives.extend(QUIET_DEPENDENCIES.iter().map(|d| d.to_string()));
    EnvFilter::try_new(directives.join(","))
        .map_err(|e| Error::Config(format!("invalid [logging] level '{}': {}", level, e)))
}

/// Start logging for one tool run.
///
/// The returned guard flushes pending lines and closes the `run` span when
/// dropped; keep it alive for the whole of `main`.
pub fn init(config: &LoggingConfig, tool: &'static str) -> Result<LoggingGuard> {
    let filter = build_filter(&config.level)?;

    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir).map_err(|e| Error::open(&log_dir, e))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .max_log_files(config.max_files.max(1))
        .build(&log_dir)
        .map_err(|e| Error::Config(format!("failed to open log directory: {}", e)))?;
    let (writer, flush_guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    let span = tracing::info_span!("run", tool).entered();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_dir = %log_dir.display(),
        "{} started",
        tool
    );

    Ok(LoggingGuard {
        _span: span,
        _flush: flush_guard,
    })
}

/// Route tracing output to the test harness. Safe to call from every test.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Keeps the log writer and the run span alive.
pub struct LoggingGuard {
    // Field order matters: the span closes before the writer flushes.
    _span: tracing::span::EnteredSpan,
    _flush: WorkerGuard,
}

/// Path of the current log file family.
pub fn log_file_path() -> PathBuf {
    Config::log_path()
}
