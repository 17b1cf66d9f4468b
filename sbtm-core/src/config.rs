//! Configuration loading and management
//!
//! Scan settings are loaded from `sbtm.toml` inside a configuration directory.
//! When no directory is given, `$XDG_CONFIG_HOME/sbtm/` (~/.config/sbtm/) is used.
//!
//! The same directory holds the label allow-lists consulted by the CHARTER
//! validator:
//! - `coverage.ini`: legal `#AREAS` values
//! - `LTTD_Areas.ini`: legal `#LTTD_AREA` values

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the settings file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "sbtm.toml";

/// Allow-list for `#AREAS` labels.
pub const COVERAGE_FILE_NAME: &str = "coverage.ini";

/// Allow-list for `#LTTD_AREA` labels.
pub const LTTD_FILE_NAME: &str = "LTTD_Areas.ini";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Input and output folders
    pub folders: FoldersConfig,

    /// Where scan diagnostics are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Relative session lengths and overlap tolerance
    pub timebox: TimeboxConfig,

    /// Optional sections and sub-sections enabled for this repository
    pub scan_options: ScanOptions,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Folder locations used by a scan.
#[derive(Debug, Deserialize, Clone)]
pub struct FoldersConfig {
    /// Directory that `DATA FILES` entries must exist in
    pub data_dir: PathBuf,
    /// Directory the metrics tables are written to
    pub metrics_dir: PathBuf,
}

/// Diagnostic output settings.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// Log file for diagnostics. Blank or absent means the console.
    pub logfile: Option<String>,
}

/// Resolved destination for scan diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Print to stdout
    Console,
    /// Write to this file
    File(PathBuf),
    /// A name was configured but was unusable; fall back to the console
    Invalid(String),
}

impl OutputConfig {
    /// Sanitize the configured log file name.
    ///
    /// Names starting with a dot are rejected and the characters `?:*"<>|`
    /// are stripped before use.
    pub fn destination(&self) -> LogDestination {
        let raw = match self.logfile.as_deref().map(str::trim) {
            None | Some("") => return LogDestination::Console,
            Some(raw) => raw,
        };

        if raw.starts_with('.') {
            return LogDestination::Invalid(raw.to_string());
        }

        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, '?' | ':' | '*' | '"' | '<' | '>' | '|'))
            .collect();

        if cleaned.trim().is_empty() {
            LogDestination::Invalid(raw.to_string())
        } else {
            LogDestination::File(PathBuf::from(cleaned))
        }
    }
}

/// Timebox weights, in minutes.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TimeboxConfig {
    pub short: f64,
    pub normal: f64,
    pub long: f64,
    /// Minutes two consecutive sessions of one tester may overlap
    #[serde(default)]
    pub allowable_session_overlap: f64,
}

impl Default for TimeboxConfig {
    fn default() -> Self {
        Self {
            short: 60.0,
            normal: 90.0,
            long: 120.0,
            allowable_session_overlap: 5.0,
        }
    }
}

impl TimeboxConfig {
    /// Weight of a `long` session relative to a `normal` one.
    pub fn long_weight(&self) -> f64 {
        self.long / self.normal
    }

    /// Weight of a `short` session relative to a `normal` one.
    pub fn short_weight(&self) -> f64 {
        self.short / self.normal
    }
}

/// Feature switches for optional sheet content.
///
/// Key names match the ones used by existing session repositories,
/// e.g. `"C vs O" = true`.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    #[serde(rename = "Duration", default)]
    pub duration: bool,
    #[serde(rename = "TBS", default)]
    pub tbs: bool,
    #[serde(rename = "C vs O", default)]
    pub charter_vs_opportunity: bool,
    #[serde(rename = "Areas", default)]
    pub areas: bool,
    #[serde(rename = "LTTD", default)]
    pub lttd: bool,
    #[serde(rename = "Build", default)]
    pub build: bool,
    #[serde(rename = "Data Files", default)]
    pub data_files: bool,
    #[serde(rename = "Warnings", default)]
    pub warnings: bool,
}

impl ScanOptions {
    /// Every switch turned on.
    pub fn all() -> Self {
        Self {
            duration: true,
            tbs: true,
            charter_vs_opportunity: true,
            areas: true,
            lttd: true,
            build: true,
            data_files: true,
            warnings: true,
        }
    }

    /// TASK BREAKDOWN is required when any of its sub-sections is enabled.
    pub fn task(&self) -> bool {
        self.duration || self.tbs || self.charter_vs_opportunity
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load `sbtm.toml` from a configuration directory.
    pub fn load_from_dir(config_dir: &Path) -> Result<Self> {
        Self::load_from(&config_dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Check that the configured folders exist and the timebox is usable.
    pub fn validate(&self) -> Result<()> {
        for folder in [&self.folders.data_dir, &self.folders.metrics_dir] {
            if !folder.is_dir() {
                return Err(Error::Config(format!(
                    "'{}' is not a valid directory; check the name specified in {}",
                    folder.display(),
                    CONFIG_FILE_NAME
                )));
            }
        }

        let timebox = &self.timebox;
        if timebox.normal <= 0.0 {
            return Err(Error::Config(
                "timebox.normal must be greater than 0".to_string(),
            ));
        }
        if timebox.short < 0.0 || timebox.long < 0.0 || timebox.allowable_session_overlap < 0.0 {
            return Err(Error::Config(
                "timebox values must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default configuration directory
    ///
    /// `$XDG_CONFIG_HOME/sbtm/` (~/.config/sbtm/)
    pub fn default_dir() -> PathBuf {
        xdg_config_home().join("sbtm")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/sbtm/` (~/.local/state/sbtm/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("sbtm")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/sbtm/sbtm.log` (~/.local/state/sbtm/sbtm.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("sbtm.log")
    }
}

/// Label allow-lists consulted by the CHARTER validator.
#[derive(Debug, Clone, Default)]
pub struct AllowLists {
    /// Upper-cased `#AREAS` labels from `coverage.ini`
    pub areas: Vec<String>,
    /// Upper-cased `#LTTD_AREA` labels from `LTTD_Areas.ini`
    pub lttd: Vec<String>,
}

impl AllowLists {
    /// Load the lists required by the enabled features.
    ///
    /// A list whose feature is off is left empty and its file is not read.
    pub fn load(config_dir: &Path, options: &ScanOptions) -> Result<Self> {
        let mut lists = AllowLists::default();
        if options.areas {
            lists.areas = load_allow_list(&config_dir.join(COVERAGE_FILE_NAME))?;
        }
        if options.lttd {
            lists.lttd = load_allow_list(&config_dir.join(LTTD_FILE_NAME))?;
        }
        Ok(lists)
    }
}

/// Read an `.ini` allow-list: one label per line, `#` comments ignored.
pub fn load_allow_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::open(path, e))?;
    Ok(parse_allow_list(&content))
}

fn parse_allow_list(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| line.trim().to_uppercase())
        .collect()
}
