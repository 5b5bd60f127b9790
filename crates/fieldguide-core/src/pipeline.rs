//! Classification pipeline: inference, then confidence, then an outcome.

use crate::confidence::{render_message, select_top, tier_of};
use crate::error::{InferenceError, Result};
use crate::inference::InferenceService;
use crate::source::ImageReference;
use crate::types::{Classification, Outcome};

/// Message for photos that could not be decoded.
pub const UNREADABLE_MESSAGE: &str = "Could not analyze image. Try another photo.";

/// Runner-ups included in a classification by default.
const DEFAULT_ALTERNATIVES: usize = 2;

/// Wires the inference service to the confidence classifier.
pub struct ClassificationPipeline {
    inference: InferenceService,
    alternatives: usize,
}

impl ClassificationPipeline {
    pub fn new(inference: InferenceService) -> Self {
        Self {
            inference,
            alternatives: DEFAULT_ALTERNATIVES,
        }
    }

    /// Number of runner-up predictions to attach (0 disables).
    pub fn with_alternatives(mut self, alternatives: usize) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn inference(&self) -> &InferenceService {
        &self.inference
    }

    /// Analyze one photo.
    ///
    /// An unreadable photo is an [`Outcome::Unreadable`], not an error. Model
    /// load failures, runtime failures and empty results are errors.
    pub async fn run(&self, image: ImageReference) -> Result<Outcome> {
        let result = match self.inference.classify(&image).await {
            Ok(result) => result,
            Err(e) if is_unreadable(&e) => {
                tracing::warn!("{}", e);
                return Ok(Outcome::Unreadable {
                    image,
                    message: UNREADABLE_MESSAGE.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let top = select_top(&result)?;
        let tier = tier_of(top.score);
        let message = render_message(&top.label, tier);
        tracing::info!(
            "{}: {} ({:.3}, {} confidence)",
            image,
            top.label,
            top.score,
            tier
        );

        let alternatives = if self.alternatives == 0 {
            Vec::new()
        } else {
            result
                .top_n(self.alternatives + 1)
                .into_iter()
                .filter(|p| p.label != top.label && !p.score.is_nan())
                .take(self.alternatives)
                .collect()
        };

        Ok(Outcome::Classified(Classification {
            image,
            label: top.label,
            score: top.score,
            tier,
            message,
            alternatives,
        }))
    }
}

fn is_unreadable(error: &InferenceError) -> bool {
    match error {
        InferenceError::Decode { .. } => true,
        InferenceError::Timeout { stage, .. } => stage == "decode",
        _ => false,
    }
}
