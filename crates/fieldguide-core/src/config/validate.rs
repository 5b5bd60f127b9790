//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if !camera.min_zoom.is_finite() || camera.min_zoom < 1.0 {
            return Err(ConfigError::ValidationError(
                "camera.min_zoom must be >= 1.0".into(),
            ));
        }
        if !camera.max_zoom.is_finite() || camera.max_zoom < camera.min_zoom {
            return Err(ConfigError::ValidationError(
                "camera.max_zoom must be >= camera.min_zoom".into(),
            ));
        }
        if camera.frame_size == 0 {
            return Err(ConfigError::ValidationError(
                "camera.frame_size must be > 0".into(),
            ));
        }
        if camera.acquire_timeout_ms == 0 || camera.capture_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "camera.acquire_timeout_ms and camera.capture_timeout_ms must be > 0".into(),
            ));
        }
        if !self.capture.timestamped && self.capture.file_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "capture.file_name must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
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
        if self.limits.inference_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.inference_timeout_ms must be > 0".into(),
            ));
        }
        if self.model.input_size == 0 {
            return Err(ConfigError::ValidationError(
                "model.input_size must be > 0".into(),
            ));
        }
        if self.model.std.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(ConfigError::ValidationError(
                "model.std values must be finite and non-zero".into(),
            ));
        }
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model.name must not be empty".into(),
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
    fn test_validate_rejects_zoom_below_one() {
        let mut config = Config::default();
        config.camera.min_zoom = 0.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_zoom"));
    }

    #[test]
    fn test_validate_rejects_inverted_zoom_range() {
        let mut config = Config::default();
        config.camera.min_zoom = 4.0;
        config.camera.max_zoom = 2.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_zoom"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_std() {
        let mut config = Config::default();
        config.model.std = [0.5, 0.0, 0.5];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model.std"));
    }

    #[test]
    fn test_validate_allows_empty_name_when_timestamped() {
        let mut config = Config::default();
        config.capture.file_name = String::new();
        assert!(config.validate().is_err());
        config.capture.timestamped = true;
        assert!(config.validate().is_ok());
    }
}
