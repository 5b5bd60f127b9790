//! Desktop camera device backed by a still image.
//!
//! The "sensor" is a square frame produced on acquisition, either from a
//! configured source image or from synthetic noise. Digital zoom is a centre
//! crop resized back to the frame size. The device is exclusive: a second
//! bind without an unbind in between is refused.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::Config;
use crate::error::{CaptureError, SessionError};

use super::device::{CameraProvider, DeviceInfo, SurfaceTarget, UseCase};

const JPEG_QUALITY: u8 = 92;

#[derive(Default)]
struct DeviceState {
    frame: Option<Arc<RgbImage>>,
    bound: bool,
    zoom: f32,
}

/// Still-image camera provider.
pub struct StillCamera {
    source: Option<PathBuf>,
    frame_size: u32,
    min_zoom: f32,
    max_zoom: f32,
    state: Mutex<DeviceState>,
}

impl StillCamera {
    /// Camera serving `source` (or noise when `None`) as square frames of
    /// `frame_size` pixels.
    pub fn new(source: Option<PathBuf>, frame_size: u32) -> Self {
        Self {
            source,
            frame_size: frame_size.max(1),
            min_zoom: 1.0,
            max_zoom: 8.0,
            state: Mutex::new(DeviceState::default()),
        }
    }

    /// Camera configured from the `[camera]` section.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.still_source(), config.camera.frame_size)
            .with_zoom_range(config.camera.min_zoom, config.camera.max_zoom)
    }

    pub fn with_zoom_range(mut self, min_zoom: f32, max_zoom: f32) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_frame(source: Option<&Path>, size: u32) -> Result<RgbImage, String> {
        match source {
            Some(path) => {
                let image = image::open(path)
                    .map_err(|e| format!("cannot read {}: {}", path.display(), e))?
                    .to_rgb8();
                if image.width() == 0 || image.height() == 0 {
                    return Err(format!("{} has no pixels", path.display()));
                }
                let square = center_crop(&image, 1.0);
                Ok(imageops::resize(&square, size, size, FilterType::Triangle))
            }
            None => {
                let mut rng = rand::thread_rng();
                Ok(RgbImage::from_fn(size, size, |_, _| {
                    Rgb([rng.gen(), rng.gen(), rng.gen()])
                }))
            }
        }
    }

    fn write_jpeg(frame: &RgbImage, destination: &Path) -> std::io::Result<()> {
        let partial = destination.with_extension("part");
        let file = File::create(&partial)?;
        let mut writer = BufWriter::new(file);
        frame
            .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY))
            .map_err(std::io::Error::other)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&partial, destination)
    }
}

/// Largest centred square, shrunk further by `zoom`.
fn center_crop(image: &RgbImage, zoom: f32) -> RgbImage {
    let side = image.width().min(image.height());
    let zoom = if zoom.is_finite() { zoom.max(1.0) } else { 1.0 };
    let cropped = ((side as f32 / zoom).round() as u32).clamp(1, side);
    let x = (image.width() - cropped) / 2;
    let y = (image.height() - cropped) / 2;
    imageops::crop_imm(image, x, y, cropped, cropped).to_image()
}

#[async_trait]
impl CameraProvider for StillCamera {
    fn name(&self) -> &str {
        "still"
    }

    async fn acquire(&self) -> Result<DeviceInfo, SessionError> {
        let source = self.source.clone();
        let size = self.frame_size;
        let frame = tokio::task::spawn_blocking(move || Self::load_frame(source.as_deref(), size))
            .await
            .map_err(|e| SessionError::AcquisitionFailed(format!("Task join error: {}", e)))?
            .map_err(SessionError::AcquisitionFailed)?;

        let mut state = self.lock();
        state.frame = Some(Arc::new(frame));
        state.zoom = self.min_zoom.max(1.0);

        let name = match &self.source {
            Some(path) => format!("still:{}", path.display()),
            None => "still:noise".to_string(),
        };
        tracing::debug!("Acquired {} ({}x{})", name, size, size);
        Ok(DeviceInfo {
            name,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
        })
    }

    async fn bind(
        &self,
        surface: &SurfaceTarget,
        use_cases: &[UseCase],
    ) -> Result<(), SessionError> {
        let mut state = self.lock();
        if state.frame.is_none() {
            return Err(SessionError::BindFailed("device not acquired".to_string()));
        }
        if state.bound {
            return Err(SessionError::DeviceClaimed);
        }
        if !use_cases.contains(&UseCase::StillCapture) {
            return Err(SessionError::BindFailed(
                "still capture use case is required".to_string(),
            ));
        }
        state.bound = true;
        tracing::debug!(
            "Bound {:?} to surface {} ({}x{})",
            use_cases,
            surface.id,
            surface.width,
            surface.height
        );
        Ok(())
    }

    async fn unbind_all(&self) {
        let mut state = self.lock();
        state.bound = false;
        state.frame = None;
    }

    async fn take_picture(&self, destination: &Path) -> Result<(), CaptureError> {
        let (frame, zoom) = {
            let state = self.lock();
            match (&state.frame, state.bound) {
                (Some(frame), true) => (Arc::clone(frame), state.zoom),
                _ => {
                    return Err(CaptureError::Failed {
                        path: destination.to_path_buf(),
                        message: "device not bound".to_string(),
                    })
                }
            }
        };

        let size = self.frame_size;
        let target = destination.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let shot = if zoom > 1.0 {
                imageops::resize(&center_crop(&frame, zoom), size, size, FilterType::Triangle)
            } else {
                frame.as_ref().clone()
            };
            Self::write_jpeg(&shot, &target)
        })
        .await
        .map_err(|e| CaptureError::Failed {
            path: destination.to_path_buf(),
            message: format!("Task join error: {}", e),
        })?
        .map_err(|e| CaptureError::Failed {
            path: destination.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn set_zoom_ratio(&self, ratio: f32) {
        self.lock().zoom = ratio;
    }
}
