//! Photo decoding: format sniffing, EXIF orientation, geometry limits.
//!
//! All file and pixel work runs on the blocking pool under
//! `limits.decode_timeout_ms`.

use exif::{In, Reader, Tag, Value};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::InferenceError;

use super::validate::Validator;

/// A decoded, upright photo.
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
    /// EXIF orientation tag that was applied, if any
    pub orientation: Option<u32>,
}

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    validator: Validator,
    limits: LimitsConfig,
}

impl ImageDecoder {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            validator: Validator::new(&limits),
            limits,
        }
    }

    /// Validate, read and decode `path`.
    pub async fn decode(&self, path: &Path) -> Result<DecodedImage, InferenceError> {
        let timeout_ms = self.limits.decode_timeout_ms;
        let max_dim = self.limits.max_image_dimension;
        let owned = path.to_path_buf();
        let validator = self.validator.clone();

        let result = timeout(
            Duration::from_millis(timeout_ms),
            tokio::task::spawn_blocking(move || {
                validator.validate(&owned)?;
                let bytes = std::fs::read(&owned).map_err(|e| InferenceError::Decode {
                    path: owned.clone(),
                    message: format!("Cannot read file: {}", e),
                })?;
                Self::decode_bytes(bytes, &owned, max_dim)
            }),
        )
        .await;

        match result {
            Ok(Ok(decoded)) => decoded,
            Ok(Err(e)) => Err(InferenceError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(InferenceError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms,
            }),
        }
    }

    /// Check a file without decoding it.
    pub fn validate(&self, path: &Path) -> Result<(), InferenceError> {
        self.validator.validate(path)
    }

    fn decode_bytes(
        bytes: Vec<u8>,
        path: &Path,
        max_dim: u32,
    ) -> Result<DecodedImage, InferenceError> {
        let fail = |message: String| InferenceError::Decode {
            path: PathBuf::from(path),
            message,
        };

        let orientation = read_orientation(&bytes);
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| fail(format!("Cannot detect image format: {}", e)))?;
        let format = reader
            .format()
            .ok_or_else(|| fail("Unknown image format".to_string()))?;
        let image = reader.decode().map_err(|e| fail(e.to_string()))?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(fail("Image has no pixels".to_string()));
        }
        if width > max_dim || height > max_dim {
            return Err(fail(format!(
                "Image is {}x{}, limit is {}px per side",
                width, height, max_dim
            )));
        }

        let image = match orientation {
            Some(tag) => apply_orientation(image, tag),
            None => image,
        };
        Ok(DecodedImage {
            image,
            format,
            orientation,
        })
    }
}

/// EXIF orientation (1-8), if the container carries one.
fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    match &field.value {
        Value::Short(v) => v.first().map(|&x| x as u32),
        Value::Long(v) => v.first().copied(),
        _ => None,
    }
}

/// Rotate/flip so the image is displayed upright.
fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}
