// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Configuration loading.

use crate::error::{ChartbumpError, ConfigError, Result};
use std::path::{Path, PathBuf};

use super::schema::ChartbumpConfig;

/// Configuration file names to search for, in order of priority.
const CONFIG_FILES: &[&str] = &["chartbump.toml", ".chartbump.toml", ".config/chartbump.toml"];

/// Find the configuration file starting from a specific directory.
pub fn find_config_file_from(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        for config_name in CONFIG_FILES {
            let config_path = current.join(config_name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    if let Some(home) = dirs::home_dir() {
        for config_name in CONFIG_FILES {
            let config_path = home.join(config_name);
            if config_path.exists() {
                return Some(config_path);
            }
        }
    }

    // XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("chartbump").join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

/// Load the nearest configuration above `start_dir`, else the defaults.
pub fn load_config(start_dir: &Path) -> Result<ChartbumpConfig> {
    match find_config_file_from(start_dir) {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("No configuration file found, using defaults");
            Ok(ChartbumpConfig::default())
        }
    }
}

/// Load configuration from a specific path.
pub fn load_config_from(path: &Path) -> Result<ChartbumpConfig> {
    tracing::debug!("Loading configuration from: {:?}", path);

    if !path.exists() {
        return Err(ChartbumpError::Config(ConfigError::NotFound {
            path: path.to_path_buf(),
        }));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ChartbumpError::Config(ConfigError::ParseError {
            message: format!("Failed to read config file: {}", e),
        })
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<ChartbumpConfig> {
    let config: ChartbumpConfig = toml::from_str(content).map_err(|e| {
        ChartbumpError::Config(ConfigError::ParseError {
            message: format!("Failed to parse TOML: {}", e),
        })
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ChartbumpConfig) -> Result<()> {
    if config.charts.metadata_file.trim().is_empty() {
        return Err(invalid("charts.metadata_file", "must not be empty"));
    }
    if config.github.per_page == 0 || config.github.per_page > 100 {
        return Err(invalid("github.per_page", "must be between 1 and 100"));
    }
    for pattern in &config.charts.exclude_paths {
        if let Err(e) = glob::Pattern::new(pattern) {
            return Err(invalid("charts.exclude_paths", &format!("{}: {}", pattern, e)));
        }
    }
    Ok(())
}

fn invalid(key: &str, message: &str) -> ChartbumpError {
    ChartbumpError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    })
}
