//! Configuration management for Reframe.
//!
//! Configuration is loaded from the platform config directory with
//! sensible defaults; a missing file is not an error.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Reframe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Conversion defaults
    pub conversion: ConversionConfig,

    /// Archive output settings
    pub archive: ArchiveConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.reframe.reframe/config.toml
    /// - Linux: ~/.config/reframe/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\reframe\config\config.toml
    ///
    /// Falls back to ~/.reframe/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "reframe", "reframe")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".reframe").join("config.toml")
            })
    }

    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.limits.max_upload_mb * 1024 * 1024
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
