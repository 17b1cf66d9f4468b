//! Setup shared by the sbtm binaries.

use anyhow::{Context, Result};
use sbtm_core::config::CONFIG_FILE_NAME;
use sbtm_core::Config;
use std::path::PathBuf;

/// A loaded configuration and the directory it came from.
pub struct Settings {
    pub config: Config,
    pub config_dir: PathBuf,
}

/// Load and check `sbtm.toml` from `config_dir`, or from the default
/// configuration directory.
pub fn load_settings(config_dir: Option<PathBuf>) -> Result<Settings> {
    let config_dir = config_dir.unwrap_or_else(Config::default_dir);
    let config = Config::load_from_dir(&config_dir).with_context(|| {
        format!(
            "failed to load {}",
            config_dir.join(CONFIG_FILE_NAME).display()
        )
    })?;
    config.validate().context("invalid configuration")?;
    Ok(Settings { config, config_dir })
}
