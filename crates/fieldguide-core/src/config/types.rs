//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where classifier models are stored
    pub model_dir: PathBuf,

    /// Application name, used for the media sub-directory
    pub app_name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.fieldguide/models"),
            app_name: "fieldguide".to_string(),
        }
    }
}

/// Camera device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Lowest zoom ratio the still camera reports
    pub min_zoom: f32,

    /// Highest zoom ratio the still camera reports
    pub max_zoom: f32,

    /// Image the still camera serves as its sensor frame.
    /// When unset, a synthetic noise frame is produced.
    pub still_source: Option<PathBuf>,

    /// Side length of the square capture target in pixels
    pub frame_size: u32,

    /// Device acquisition + binding timeout in milliseconds
    pub acquire_timeout_ms: u64,

    /// Photo capture timeout in milliseconds
    pub capture_timeout_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            max_zoom: 8.0,
            still_source: None,
            frame_size: 1024,
            acquire_timeout_ms: 5000,
            capture_timeout_ms: 10000,
        }
    }
}

/// Capture output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Explicit output directory. When unset the app media directory is used.
    pub output_dir: Option<PathBuf>,

    /// Fixed output filename (only one capture is ever outstanding)
    pub file_name: String,

    /// Use a timestamp-derived filename instead of `file_name`
    pub timestamped: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_name: "buff.jpg".to_string(),
            timestamped: false,
        }
    }
}

/// Gallery (external image picker) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Directory browsed by the picker
    pub dir: String,

    /// File extensions offered by the picker
    pub supported_formats: Vec<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            dir: "~/Pictures".to_string(),
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Model load + inference timeout in milliseconds
    pub inference_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            inference_timeout_ms: 30000,
        }
    }
}

/// Element type of the model's input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Raw 0-255 pixel values (quantized models)
    U8,
    /// `(pixel / 255 - mean) / std`
    F32,
}

/// Memory layout of the model's input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`
    Nhwc,
    /// `[batch, channels, height, width]`
    Nchw,
}

/// Classifier model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name; also the sub-directory of `general.model_dir`
    pub name: String,

    /// Square input side length declared by the model
    pub input_size: u32,

    /// Input element type
    pub input_type: InputType,

    /// Input tensor layout
    pub layout: TensorLayout,

    /// Per-channel normalization mean (only for `f32` input)
    pub mean: [f32; 3],

    /// Per-channel normalization std (only for `f32` input)
    pub std: [f32; 3],

    /// Label vocabulary filename inside the model directory
    pub labels_file: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "aiy-birds-v1".to_string(),
            input_size: 224,
            input_type: InputType::U8,
            layout: TensorLayout::Nhwc,
            mean: [0.0, 0.0, 0.0],
            std: [1.0, 1.0, 1.0],
            labels_file: "labels.txt".to_string(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Machine-readable output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
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
