//! Configuration management for Fieldguide.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file is fine.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Fieldguide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Camera device settings
    pub camera: CameraConfig,

    /// Capture output settings
    pub capture: CaptureConfig,

    /// Gallery picker settings
    pub gallery: GalleryConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Classifier model settings
    pub model: ModelConfig,

    /// Output settings
    pub output: OutputConfig,

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
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.fieldguide.fieldguide/config.toml
    /// - Linux: ~/.config/fieldguide/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\fieldguide\config\config.toml
    ///
    /// Falls back to ~/.fieldguide/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "fieldguide", "fieldguide")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| fallback_app_dir().join("config.toml"))
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        expand(&self.general.model_dir.to_string_lossy())
    }

    /// Directory holding the configured model and its label file.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join(&self.model.name)
    }

    /// Get the resolved gallery directory path (with ~ expansion).
    pub fn gallery_dir(&self) -> PathBuf {
        expand(&self.gallery.dir)
    }

    /// Get the resolved still-camera source image, if any.
    pub fn still_source(&self) -> Option<PathBuf> {
        self.camera
            .still_source
            .as_ref()
            .map(|p| expand(&p.to_string_lossy()))
    }

    /// Directory for app state that is not configuration (permission registry).
    pub fn data_dir() -> PathBuf {
        directories::ProjectDirs::from("com", "fieldguide", "fieldguide")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(fallback_app_dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// General app-private directory used when platform directories are unknown.
pub fn fallback_app_dir() -> PathBuf {
    expand("~/.fieldguide")
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.camera.max_zoom, 8.0);
        assert_eq!(config.capture.file_name, "buff.jpg");
        assert_eq!(config.model.input_size, 224);
        assert_eq!(config.model.input_type, InputType::U8);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[camera]"));
        assert!(toml.contains("[model]"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [camera]
            max_zoom = 4.0

            [model]
            input_type = "f32"
            layout = "nchw"
            "#,
        )
        .unwrap();
        assert_eq!(config.camera.max_zoom, 4.0);
        assert_eq!(config.camera.min_zoom, 1.0);
        assert_eq!(config.model.input_type, InputType::F32);
        assert_eq!(config.model.layout, TensorLayout::Nchw);
        assert_eq!(config.capture.file_name, "buff.jpg");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::from_toml("[camera\nmax_zoom = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_model_path_joins_name() {
        let mut config = Config::default();
        config.general.model_dir = PathBuf::from("/opt/models");
        assert_eq!(config.model_path(), PathBuf::from("/opt/models/aiy-birds-v1"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[capture]\ntimestamped = true\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(config.capture.timestamped);
    }
}
