//! Cheap checks before a photo is decoded.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::InferenceError;

/// Rejects files that are missing, oversized or not an image.
#[derive(Debug, Clone)]
pub struct Validator {
    max_bytes: u64,
    max_file_size_mb: u64,
}

impl Validator {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_bytes: limits.max_file_size_mb * 1024 * 1024,
            max_file_size_mb: limits.max_file_size_mb,
        }
    }

    /// File exists, fits the size limit and starts with a known image signature.
    pub fn validate(&self, path: &Path) -> Result<(), InferenceError> {
        let fail = |message: String| InferenceError::Decode {
            path: path.to_path_buf(),
            message,
        };

        let metadata = std::fs::metadata(path).map_err(|e| fail(format!("Cannot read file: {}", e)))?;
        if !metadata.is_file() {
            return Err(fail("Not a regular file".to_string()));
        }
        if metadata.len() > self.max_bytes {
            return Err(fail(format!(
                "File is {}MB, limit is {}MB",
                metadata.len() / (1024 * 1024),
                self.max_file_size_mb
            )));
        }

        let mut header = [0u8; 12];
        let mut file =
            std::fs::File::open(path).map_err(|e| fail(format!("Cannot open file: {}", e)))?;
        let read = file.read(&mut header).unwrap_or(0);
        if !has_image_signature(&header[..read]) {
            return Err(fail("Unrecognized image format".to_string()));
        }
        Ok(())
    }
}

/// Known magic numbers for the formats the decoder handles.
fn has_image_signature(header: &[u8]) -> bool {
    matches!(
        header,
        [0xFF, 0xD8, 0xFF, ..]
            | [0x89, b'P', b'N', b'G', ..]
            | [b'G', b'I', b'F', b'8', ..]
            | [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..]
            | [b'B', b'M', _, _, ..]
            | [b'I', b'I', 0x2A, 0x00, ..]
            | [b'M', b'M', 0x00, 0x2A, ..]
    )
}
