//! Core data types flowing from the classifier to the result presenter.

use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceTier;
use crate::source::ImageReference;

/// A single (label, score) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class label from the model vocabulary
    pub label: String,

    /// Model score, expected in [0, 1] and surfaced as-is
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Scores for every class the model supports, in canonical label order.
///
/// Produced fresh per image; never cached across requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    predictions: Vec<Prediction>,
}

impl ClassificationResult {
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self { predictions }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.predictions.iter()
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// The `n` highest-scoring predictions, ties kept in canonical order.
    pub fn top_n(&self, n: usize) -> Vec<Prediction> {
        let mut ranked: Vec<&Prediction> = self.predictions.iter().collect();
        // Stable sort keeps canonical order among equal scores.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.into_iter().take(n).cloned().collect()
    }
}

/// What the result presenter receives for a successfully analyzed photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// The photo that was classified
    pub image: ImageReference,

    /// Winning label
    pub label: String,

    /// Score of the winning label
    pub score: f32,

    /// Confidence tier of `score`
    pub tier: ConfidenceTier,

    /// Rendered user-facing message
    pub message: String,

    /// Runner-up predictions, highest first
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternatives: Vec<Prediction>,
}

/// Final result of analyzing one photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The classifier ran and a message was derived
    Classified(Classification),

    /// The photo could not be decoded; nothing was classified
    Unreadable {
        image: ImageReference,
        message: String,
    },
}

impl Outcome {
    pub fn image(&self) -> &ImageReference {
        match self {
            Outcome::Classified(c) => &c.image,
            Outcome::Unreadable { image, .. } => image,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Classified(c) => &c.message,
            Outcome::Unreadable { message, .. } => message,
        }
    }
}
