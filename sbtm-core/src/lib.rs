//! # sbtm-core
//!
//! Core library for sbtm - a scanner for session-based test management
//! (SBTM) session sheets.
//!
//! This library provides:
//! - Domain types for session sheets, sections and derived metrics
//! - The section splitter and per-section validators
//! - Session metrics and the aggregation engine
//! - Tab-separated metrics tables consumed by the report pages
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! A scan works in three stages:
//! - **Split:** each `.ses` sheet is cut into its eight sections
//! - **Validate:** each section is checked and its data extracted; problems
//!   become [`Diagnostic`]s, never errors
//! - **Aggregate:** sessions with a valid START timestamp are folded into
//!   per-day, per-tester and per-area tables
//!
//! ## Example
//!
//! ```rust,no_run
//! use sbtm_core::{Config, DiagnosticSink, Scanner};
//! use std::path::Path;
//!
//! let config_dir = Config::default_dir();
//! let config = Config::load_from_dir(&config_dir).expect("failed to load config");
//!
//! let mut sink = DiagnosticSink::console(config.scan_options.warnings);
//! let report = Scanner::new(config, config_dir)
//!     .scan(Path::new("sessions"), &mut sink)
//!     .expect("scan failed");
//! println!("{} sessions recorded", report.sessions_recorded);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use error::{Error, Result};
pub use scan::{ScanReport, Scanner};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod logging;
pub mod metrics;
pub mod outputs;
pub mod scan;
pub mod search;
pub mod sheet;
pub mod summary;
pub mod todo;
pub mod tsv;
pub mod types;
pub mod validate;
