//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use samarth_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::Path;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "samarth.toml";

/// Load defaults, then the config file, then the environment, then CLI flags
pub fn load_config(path: Option<&Path>, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults();

    let config = match path {
        Some(path) => config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => config
            .load_from_optional_file(DEFAULT_CONFIG_FILE)
            .context("Failed to load samarth.toml")?,
    };

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    config.warn_missing_keys();

    Ok(config)
}
