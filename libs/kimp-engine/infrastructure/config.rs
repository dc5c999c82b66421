//! Board configuration, loaded from YAML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level board configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub markets: MarketsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    pub detail: DetailConfig,
}

/// The initial market pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketsConfig {
    pub main: String,
    pub compare: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long a change flag stays raised after a price delta.
    #[serde(default = "default_flag_ttl_ms")]
    pub flag_ttl_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flag_ttl_ms: default_flag_ttl_ms(),
        }
    }
}

fn default_flag_ttl_ms() -> u64 {
    200
}

/// Metadata service settings for the detail cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailConfig {
    pub base_url: String,
    #[serde(default = "default_detail_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_detail_timeout_secs() -> u64 {
    10
}

impl BoardConfig {
    /// Load configuration from a YAML file.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let config: BoardConfig = serde_yaml::from_str(&yaml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.markets.main.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "markets.main must not be empty".to_string(),
            ));
        }

        if self.markets.compare.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "markets.compare must not be empty".to_string(),
            ));
        }

        if self.engine.flag_ttl_ms == 0 {
            return Err(ConfigError::ValidationError(
                "engine.flag_ttl_ms must be greater than 0".to_string(),
            ));
        }

        if self.detail.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "detail.base_url must not be empty".to_string(),
            ));
        }

        if self.detail.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "detail.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
