//! Error types for sbtm-core
//!
//! Only failures that abort a scan run live here. Problems found inside a
//! session sheet are reported as [`Diagnostic`](crate::diagnostics::Diagnostic)
//! values instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the sbtm-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file required by the run could not be opened or created
    #[error("can't open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid discovery pattern
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an IO error raised while opening `path`.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileOpen {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for sbtm-core
pub type Result<T> = std::result::Result<T, Error>;
