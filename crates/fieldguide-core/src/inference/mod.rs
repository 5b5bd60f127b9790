//! On-device classification.
//!
//! The [`InferenceService`] turns an [`ImageReference`] into a ranked
//! label/score list:
//!
//! ```text
//! file → validate → decode (+ EXIF orientation) → crop/resize → model → scores
//! ```
//!
//! The model itself sits behind the [`ImageClassifier`] seam. It is loaded
//! lazily on the first request; a load failure is remembered and reported on
//! every later call without retrying.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fieldguide_core::inference::InferenceService;
//!
//! let service = InferenceService::new(&config);
//! let result = service.classify(&image).await?;
//! ```

pub mod decode;
pub mod labels;
pub mod onnx;
pub mod preprocess;
pub mod stub;
mod validate;

pub use decode::{DecodedImage, ImageDecoder};
pub use labels::LabelSet;
pub use onnx::OnnxClassifier;
pub use preprocess::InputTensor;
pub use stub::StubClassifier;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time::timeout;

use crate::config::{Config, ModelConfig};
use crate::error::InferenceError;
use crate::source::ImageReference;
use crate::types::ClassificationResult;

/// A fixed-shape image classifier.
///
/// Called from the blocking pool; implementations may block.
pub trait ImageClassifier: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Run the model once on a preprocessed input.
    ///
    /// Returns one prediction per class in canonical label order.
    fn classify(
        &self,
        input: &InputTensor,
        path: &Path,
    ) -> Result<ClassificationResult, InferenceError>;
}

type Loader = Arc<dyn Fn() -> Result<Arc<dyn ImageClassifier>, InferenceError> + Send + Sync>;

/// Decodes photos and runs them through the classifier.
pub struct InferenceService {
    decoder: ImageDecoder,
    model: ModelConfig,
    inference_timeout_ms: u64,
    loader: Loader,
    classifier: OnceCell<Result<Arc<dyn ImageClassifier>, InferenceError>>,
}

impl InferenceService {
    /// Service backed by the ONNX model configured in `config`.
    pub fn new(config: &Config) -> Self {
        let model_dir = config.model_path();
        let model = config.model.clone();
        Self::with_loader(config, move || {
            let classifier = OnnxClassifier::load(&model_dir, &model)?;
            Ok(Arc::new(classifier) as Arc<dyn ImageClassifier>)
        })
    }

    /// Service using an already constructed classifier.
    pub fn with_classifier(config: &Config, classifier: Arc<dyn ImageClassifier>) -> Self {
        Self::with_loader(config, move || Ok(Arc::clone(&classifier)))
    }

    /// Service that builds its classifier on first use with `loader`.
    pub fn with_loader<F>(config: &Config, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ImageClassifier>, InferenceError> + Send + Sync + 'static,
    {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            model: config.model.clone(),
            inference_timeout_ms: config.limits.inference_timeout_ms,
            loader: Arc::new(loader),
            classifier: OnceCell::new(),
        }
    }

    /// Whether a load has been attempted and succeeded.
    pub fn is_loaded(&self) -> bool {
        matches!(self.classifier.get(), Some(Ok(_)))
    }

    /// Load the model now instead of on the first request.
    pub async fn warm_up(&self) -> Result<(), InferenceError> {
        self.classifier().await.map(|_| ())
    }

    /// Classify one photo.
    ///
    /// Each call decodes and runs the model afresh; nothing is cached between
    /// requests except the loaded model.
    pub async fn classify(
        &self,
        image: &ImageReference,
    ) -> Result<ClassificationResult, InferenceError> {
        let classifier = self.classifier().await?;
        let path = image.path().to_path_buf();

        let decoded = self.decoder.decode(&path).await?;
        tracing::debug!(
            "Decoded {:?} ({:?}, {}x{}, orientation {:?})",
            path,
            decoded.format,
            decoded.image.width(),
            decoded.image.height(),
            decoded.orientation
        );

        let model = self.model.clone();
        let task_path = path.clone();
        let result = timeout(
            Duration::from_millis(self.inference_timeout_ms),
            tokio::task::spawn_blocking(move || {
                let input = preprocess::preprocess(&decoded.image, &model);
                classifier.classify(&input, &task_path)
            }),
        )
        .await;

        let result = match result {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(InferenceError::Inference {
                    path,
                    message: format!("Task join error: {}", e),
                })
            }
            Err(_) => {
                return Err(InferenceError::Timeout {
                    path,
                    stage: "inference".to_string(),
                    timeout_ms: self.inference_timeout_ms,
                })
            }
        };

        tracing::debug!("Classified {:?}: {} classes", path, result.len());
        Ok(result)
    }

    async fn classifier(&self) -> Result<Arc<dyn ImageClassifier>, InferenceError> {
        let loaded = self
            .classifier
            .get_or_init(|| async {
                let loader = Arc::clone(&self.loader);
                let loaded = tokio::task::spawn_blocking(move || loader())
                    .await
                    .unwrap_or_else(|e| {
                        Err(InferenceError::ModelLoad {
                            path: Default::default(),
                            message: format!("Task join error: {}", e),
                        })
                    });
                match &loaded {
                    Ok(classifier) => tracing::info!("Classifier ready ({})", classifier.name()),
                    Err(e) => tracing::error!("{}", e),
                }
                loaded
            })
            .await;
        loaded.clone()
    }
}
