//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_upload_mb: u64,

    /// Maximum source image dimension (width or height)
    pub max_image_dimension: u32,

    /// Source decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Per-spec transform timeout in milliseconds
    pub transform_timeout_ms: u64,

    /// Whole-request deadline in milliseconds
    pub request_deadline_ms: u64,

    /// Max transforms running at once within one request
    pub max_concurrent_transforms: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: 10,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            transform_timeout_ms: 15000,
            request_deadline_ms: 30000,
            max_concurrent_transforms: 8,
        }
    }
}

/// Conversion defaults for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Default encode quality in the CLI's 1-100 scale
    pub default_quality: u8,

    /// Default output format offered by the prompts
    pub default_format: String,

    /// Accepted input file extensions
    pub supported_formats: Vec<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_quality: 85,
            default_format: "webp".to_string(),
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "avif".to_string(),
            ],
        }
    }
}

/// Archive output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Deflate compression level (0-9)
    pub compression_level: u32,

    /// Download file name offered to HTTP clients
    pub file_name: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: 9,
            file_name: "images.zip".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Log format ("pretty" or "json")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
