//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_upload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.transform_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.transform_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.request_deadline_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_deadline_ms must be > 0".into(),
            ));
        }
        if self.limits.max_concurrent_transforms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_concurrent_transforms must be > 0".into(),
            ));
        }
        if self.conversion.default_quality == 0 || self.conversion.default_quality > 100 {
            return Err(ConfigError::ValidationError(
                "conversion.default_quality must be between 1 and 100".into(),
            ));
        }
        if self.conversion.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "conversion.supported_formats must not be empty".into(),
            ));
        }
        if self.archive.compression_level > 9 {
            return Err(ConfigError::ValidationError(
                "archive.compression_level must be between 0 and 9".into(),
            ));
        }
        if self.archive.file_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "archive.file_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_upload_limit() {
        let mut config = Config::default();
        config.limits.max_upload_mb = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_upload_mb"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.transform_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("transform_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.limits.max_concurrent_transforms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_transforms"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_quality() {
        let mut config = Config::default();
        config.conversion.default_quality = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_quality"));

        config.conversion.default_quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_quality"));
    }

    #[test]
    fn test_validate_rejects_bad_compression_level() {
        let mut config = Config::default();
        config.archive.compression_level = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("compression_level"));
    }
}
