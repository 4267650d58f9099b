//! Configuration loading for the sourcedeck TUI.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::Deserialize;
use sourcedeck_core::{QueryDefaults, QueryRange};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    /// Start-index increment of the Previous/Next pagination.
    pub page_step: i64,
    pub query: QueryConfig,
}

/// Fixed parameters of every filtered query the client submits.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    pub range_start: i64,
    pub range_end: i64,
    pub stores: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or SOURCEDECK_TUI_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: TuiConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.page_step <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_step",
                reason: "must be > 0".to_string(),
            });
        }
        if self.query.range_end < self.query.range_start {
            return Err(ConfigError::InvalidValue {
                field: "query.range_end",
                reason: "must be >= query.range_start".to_string(),
            });
        }
        Ok(())
    }

    pub fn query_defaults(&self) -> QueryDefaults {
        QueryDefaults {
            range: QueryRange {
                start: self.query.range_start,
                end: self.query.range_end,
            },
            stores: self.query.stores.clone(),
        }
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("SOURCEDECK_TUI_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
