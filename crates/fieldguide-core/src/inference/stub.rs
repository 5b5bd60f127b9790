use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::InferenceError;
use crate::types::{ClassificationResult, Prediction};

use super::preprocess::InputTensor;
use super::ImageClassifier;

/// Classifier that returns fixed scores, for tests and demos.
#[derive(Debug, Default)]
pub struct StubClassifier {
    predictions: Vec<Prediction>,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn new<L: Into<String>>(scores: impl IntoIterator<Item = (L, f32)>) -> Self {
        Self {
            predictions: scores
                .into_iter()
                .map(|(label, score)| Prediction::new(label, score))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the model was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageClassifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn classify(
        &self,
        _input: &InputTensor,
        _path: &Path,
    ) -> Result<ClassificationResult, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ClassificationResult::new(self.predictions.clone()))
    }
}
