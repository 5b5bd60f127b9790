//! Fieldguide Core - take or pick a photo, classify it on-device, explain how
//! sure the model is.
//!
//! # Architecture
//!
//! ```text
//! PermissionCoordinator ─gates─▶ CaptureSessionManager ─┐
//!                                                       ├─▶ ImageReference
//!                      Gallery / ImageSourceRouter ─────┘         │
//!                                                                 ▼
//!            ResultPresenter ◀─ Outcome ◀─ confidence ◀─ InferenceService
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fieldguide_core::{
//!     CaptureSessionManager, CaptureStorage, ClassificationPipeline, Config,
//!     InferenceService, StillCamera, SurfaceTarget,
//! };
//!
//! #[tokio::main]
//! async fn main() -> fieldguide_core::Result<()> {
//!     let config = Config::load()?;
//!     let camera = Arc::new(StillCamera::from_config(&config));
//!     let session = CaptureSessionManager::new(camera, &config.camera);
//!     session.activate(SurfaceTarget::square("preview", 224)).await?;
//!
//!     let storage = CaptureStorage::from_config(&config)?;
//!     let photo = session.capture(storage.next_destination()).await?;
//!     session.deactivate().await;
//!
//!     let pipeline = ClassificationPipeline::new(InferenceService::new(&config));
//!     println!("{}", pipeline.run(photo).await?.message());
//!     Ok(())
//! }
//! ```

pub mod camera;
pub mod confidence;
pub mod config;
pub mod error;
pub mod inference;
pub mod output;
pub mod permission;
pub mod pipeline;
pub mod source;
pub mod storage;
pub mod types;

pub use camera::{
    CameraProvider, CaptureSessionManager, DeviceInfo, SessionHandle, SessionSnapshot,
    SessionState, StillCamera, SurfaceTarget,
};
pub use confidence::{render_message, select_top, tier_of, ConfidenceTier, TopLabel};
pub use config::Config;
pub use error::{
    CaptureError, ConfidenceError, ConfigError, FieldguideError, InferenceError, PermissionError,
    Result, SessionError,
};
pub use inference::{ImageClassifier, InferenceService, OnnxClassifier, StubClassifier};
pub use output::{OutputFormat, OutputWriter, ResultPresenter};
pub use permission::{
    PermissionAction, PermissionCoordinator, PermissionSource, PermissionState, PermissionStore,
};
pub use pipeline::ClassificationPipeline;
pub use source::{ContentHandle, Gallery, ImageOrigin, ImageReference, ImageSourceRouter};
pub use storage::CaptureStorage;
pub use types::{Classification, ClassificationResult, Outcome, Prediction};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
