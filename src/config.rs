//! Configuration management for NovelBin.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use crate::sources::allnovelbin::{BASE_URL, MOBILE_USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "NovelBin";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Web scraping settings.
    pub scraping: ScrapingConfig,
}

/// Web scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Site root that listing, search and AJAX paths are built from.
    pub base_url: String,

    /// User-agent sent on detail and search requests.
    pub user_agent: String,

    /// Request timeout in seconds.
    pub timeout_sec: u64,

    /// Enable scraper debug logging.
    pub debug: bool,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            user_agent: MOBILE_USER_AGENT.to_string(),
            timeout_sec: 30,
            debug: false,
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = url::Url::parse(&self.scraping.base_url).map_err(|e| {
            ConfigError::InvalidValue {
                key: "scraping.base_url".to_string(),
                message: e.to_string(),
            }
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "scraping.base_url".to_string(),
                message: format!("unsupported scheme '{}'", base.scheme()),
            });
        }

        if self.scraping.timeout_sec == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scraping.timeout_sec".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
