//! The `fieldguide capture` command: take a photo, then identify it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use fieldguide_core::{
    CaptureSessionManager, CaptureStorage, Config, ImageReference, PermissionState,
    ResultPresenter, StillCamera, SurfaceTarget,
};

use super::classify::{self, OutputArgs};
use super::permission::ensure_camera_permission;

/// Arguments for the `capture` command.
#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Image the still camera serves as its sensor frame (overrides `camera.still_source`)
    #[arg(long, value_name = "IMAGE")]
    pub source: Option<PathBuf>,

    /// Absolute zoom ratio for the shot (e.g. 2.0), clamped to the camera's range
    #[arg(long, default_value = "1.0")]
    pub zoom: f32,

    /// Directory to save the photo in (overrides `capture.output_dir`)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Name the photo after the capture time instead of overwriting one file
    #[arg(long)]
    pub timestamped: bool,

    /// Save the photo without classifying it
    #[arg(long)]
    pub no_classify: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl Default for CaptureArgs {
    fn default() -> Self {
        Self {
            source: None,
            zoom: 1.0,
            output_dir: None,
            timestamped: false,
            no_classify: false,
            output: OutputArgs::default(),
        }
    }
}

/// Execute the capture command.
pub async fn execute(args: CaptureArgs, config: &Config) -> anyhow::Result<()> {
    let config = with_overrides(config, &args);
    let mut presenter = classify::presenter(&args.output, &config)?;

    let state = ensure_camera_permission(&Config::data_dir())?;
    if state != PermissionState::Granted {
        tracing::info!("Camera permission is {state:?}; not activating the camera");
        presenter.notice("Camera permission not granted.")?;
        return Ok(());
    }

    let Some(photo) = take_photo(&config, args.zoom, presenter.as_mut()).await? else {
        return Ok(());
    };

    if args.no_classify {
        println!("{}", photo.path().display());
        return Ok(());
    }
    classify::classify(&config, photo, presenter.as_mut(), true).await
}

/// Run one camera session: activate, zoom, shoot, release.
///
/// `zoom` is an absolute ratio. Device and capture failures become notices
/// and yield `None`. The output directory is resolved before the camera is
/// touched, so a storage error never leaves a session bound.
pub async fn take_photo(
    config: &Config,
    zoom: f32,
    presenter: &mut dyn ResultPresenter,
) -> anyhow::Result<Option<ImageReference>> {
    let storage = match CaptureStorage::from_config(config) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::warn!("No usable output directory: {e}");
            presenter.notice(&format!("Could not save photos: {e}"))?;
            return Ok(None);
        }
    };

    let camera = Arc::new(StillCamera::from_config(config));
    let session = CaptureSessionManager::new(camera, &config.camera);

    let surface = SurfaceTarget::square("preview", config.camera.frame_size);
    if let Err(e) = session.activate(surface).await {
        tracing::warn!("Camera activation failed: {e}");
        presenter.notice(&format!("Could not start the camera: {e}"))?;
        return Ok(None);
    }

    let ratio = session.zoom_to(zoom).await;
    tracing::debug!("Zoom ratio {ratio:.2}");

    let result = session.capture(storage.next_destination()).await;
    session.deactivate().await;

    match result {
        Ok(photo) => {
            tracing::info!("Photo saved to {}", photo.path().display());
            Ok(Some(photo))
        }
        Err(e) => {
            tracing::warn!("Capture failed: {e}");
            presenter.notice(&format!("Could not take the photo: {e}"))?;
            Ok(None)
        }
    }
}

fn with_overrides(config: &Config, args: &CaptureArgs) -> Config {
    let mut config = config.clone();
    if let Some(source) = &args.source {
        config.camera.still_source = Some(source.clone());
    }
    if let Some(dir) = &args.output_dir {
        config.capture.output_dir = Some(dir.clone());
    }
    if args.timestamped {
        config.capture.timestamped = true;
    }
    config
}
