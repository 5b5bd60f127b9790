//! Camera device seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CaptureError, SessionError};

/// Stream kinds bound to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UseCase {
    /// Live preview frames
    Preview,
    /// Full-resolution still capture
    StillCapture,
}

/// Where preview frames are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceTarget {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl SurfaceTarget {
    /// A square preview surface, matching a square capture target.
    pub fn square(id: impl Into<String>, side: u32) -> Self {
        Self {
            id: id.into(),
            width: side,
            height: side,
        }
    }
}

/// What a device reports once acquired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable device name
    pub name: String,
    /// Smallest supported zoom ratio (>= 1.0)
    pub min_zoom: f32,
    /// Largest supported zoom ratio
    pub max_zoom: f32,
}

/// A camera device driver.
///
/// Calls are issued one at a time by the session's device worker; binding is
/// not required to be reentrant.
#[async_trait]
pub trait CameraProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Acquire the device and report its capabilities.
    async fn acquire(&self) -> Result<DeviceInfo, SessionError>;

    /// Bind the given use cases, delivering preview frames to `surface`.
    async fn bind(&self, surface: &SurfaceTarget, use_cases: &[UseCase])
        -> Result<(), SessionError>;

    /// Release every bound stream. Idempotent.
    async fn unbind_all(&self);

    /// Take a still photo and durably write it to `destination`.
    async fn take_picture(&self, destination: &Path) -> Result<(), CaptureError>;

    /// Apply a zoom ratio to frames produced from now on.
    fn set_zoom_ratio(&self, ratio: f32);
}
