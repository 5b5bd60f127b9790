//! ONNX Runtime classifier.
//!
//! Expects `<model dir>/model.onnx` with one image input and a first output
//! holding one score per label, as `f32` or quantized `u8`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ort::session::Session;
use ort::value::{DynValue, Value};

use crate::config::ModelConfig;
use crate::error::InferenceError;
use crate::types::{ClassificationResult, Prediction};

use super::labels::LabelSet;
use super::preprocess::InputTensor;
use super::ImageClassifier;

/// Model filename inside the model directory.
pub const MODEL_FILENAME: &str = "model.onnx";

/// Classifier backed by an ONNX Runtime session.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    labels: LabelSet,
    model_path: PathBuf,
}

impl OnnxClassifier {
    /// Load `model.onnx` and the label file from `model_dir`.
    pub fn load(model_dir: &Path, config: &ModelConfig) -> Result<Self, InferenceError> {
        let model_path = model_dir.join(MODEL_FILENAME);
        let load_error = |message: String| InferenceError::ModelLoad {
            path: model_path.clone(),
            message,
        };

        if !model_path.exists() {
            return Err(load_error(
                "Model not found. Run `fieldguide models install` first.".to_string(),
            ));
        }
        let labels = LabelSet::load(&model_dir.join(&config.labels_file))?;

        tracing::info!("Loading classifier from {:?}", model_path);
        let session = Session::builder()
            .map_err(|e| load_error(format!("Failed to create ONNX session builder: {e}")))?
            .commit_from_file(&model_path)
            .map_err(|e| load_error(format!("Failed to load ONNX model: {e}")))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| load_error("Model declares no inputs".to_string()))?;

        tracing::debug!(
            "Loaded classifier (input: {:?}, outputs: {:?}, {} labels)",
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>(),
            labels.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            labels,
            model_path,
        })
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn input_value(&self, input: &InputTensor, path: &Path) -> Result<DynValue, InferenceError> {
        let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let value = match input {
            InputTensor::U8(t) => {
                let data: Vec<u8> = t.iter().copied().collect();
                Value::from_array((shape, data)).map(|v| v.into_dyn())
            }
            InputTensor::F32(t) => {
                let data: Vec<f32> = t.iter().copied().collect();
                Value::from_array((shape, data)).map(|v| v.into_dyn())
            }
        };
        value.map_err(|e| InferenceError::Inference {
            path: path.to_path_buf(),
            message: format!("Failed to create input tensor: {e}"),
        })
    }
}

impl ImageClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn classify(
        &self,
        input: &InputTensor,
        path: &Path,
    ) -> Result<ClassificationResult, InferenceError> {
        let fail = |message: String| InferenceError::Inference {
            path: path.to_path_buf(),
            message,
        };

        let value = self.input_value(input, path)?;
        let inputs = ort::inputs![self.input_name.as_str() => value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| fail(format!("Session lock poisoned: {e}")))?;
        let outputs = session
            .run(inputs)
            .map_err(|e| fail(format!("ONNX inference failed: {e}")))?;

        let (_, scores) = outputs
            .iter()
            .next()
            .ok_or_else(|| fail("Model produced no outputs".to_string()))?;

        let scores: Vec<f32> = match scores.try_extract_tensor::<f32>() {
            Ok((_, data)) => data.to_vec(),
            Err(_) => {
                let (_, data) = scores
                    .try_extract_tensor::<u8>()
                    .map_err(|e| fail(format!("Unsupported output tensor: {e}")))?;
                data.iter().map(|&q| q as f32 / 255.0).collect()
            }
        };

        if scores.len() != self.labels.len() {
            return Err(fail(format!(
                "Model {:?} produced {} scores for {} labels",
                self.model_path,
                scores.len(),
                self.labels.len()
            )));
        }

        Ok(ClassificationResult::new(
            self.labels
                .iter()
                .zip(scores)
                .map(|(label, score)| Prediction::new(label, score))
                .collect(),
        ))
    }
}
