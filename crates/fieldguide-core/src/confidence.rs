//! Top-label selection and confidence tiers.
//!
//! Everything here is a pure function of the classification result: the
//! message for a photo depends only on `(label, score)`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfidenceError;
use crate::types::ClassificationResult;

/// Upper bounds (inclusive) of the `Unclear`, `Low`, `Medium` and `High` tiers.
const UNCLEAR_MAX: f32 = 0.3;
const LOW_MAX: f32 = 0.5;
const MEDIUM_MAX: f32 = 0.7;
const HIGH_MAX: f32 = 0.9;

/// Message shown when the top score is too low to name the label.
pub const UNCLEAR_MESSAGE: &str =
    "The result is not confident enough to name what is in this photo. Try another shot.";

/// Discrete bucket summarizing the top score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Unclear,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceTier {
    /// Qualifier word used in the message; `None` for `Unclear`.
    pub fn qualifier(self) -> Option<&'static str> {
        match self {
            ConfidenceTier::Unclear => None,
            ConfidenceTier::Low => Some("low"),
            ConfidenceTier::Medium => Some("medium"),
            ConfidenceTier::High => Some("high"),
            ConfidenceTier::VeryHigh => Some("very high"),
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualifier().unwrap_or("unclear"))
    }
}

/// The winning (label, score) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TopLabel {
    pub label: String,
    pub score: f32,
}

/// Pick the entry with the maximum score.
///
/// Ties go to the entry that comes first in canonical label order. NaN scores
/// never win against a number. An empty result is an error, never a
/// placeholder label.
pub fn select_top(result: &ClassificationResult) -> Result<TopLabel, ConfidenceError> {
    let mut best: Option<(&str, f32)> = None;

    for prediction in result.iter() {
        let beats = match best {
            None => true,
            Some((_, best_score)) => {
                (best_score.is_nan() && !prediction.score.is_nan()) || prediction.score > best_score
            }
        };
        if beats {
            best = Some((&prediction.label, prediction.score));
        }
    }

    best.map(|(label, score)| TopLabel {
        label: label.to_string(),
        score,
    })
    .ok_or(ConfidenceError::EmptyResult)
}

/// Map a score to its tier. Boundary values belong to the lower tier.
pub fn tier_of(score: f32) -> ConfidenceTier {
    if score.is_nan() || score <= UNCLEAR_MAX {
        ConfidenceTier::Unclear
    } else if score <= LOW_MAX {
        ConfidenceTier::Low
    } else if score <= MEDIUM_MAX {
        ConfidenceTier::Medium
    } else if score <= HIGH_MAX {
        ConfidenceTier::High
    } else {
        ConfidenceTier::VeryHigh
    }
}

/// Render the user-facing message for a label at a given tier.
pub fn render_message(label: &str, tier: ConfidenceTier) -> String {
    match tier.qualifier() {
        None => UNCLEAR_MESSAGE.to_string(),
        Some(qualifier) => format!("This looks like a {label} ({qualifier} confidence)."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Prediction;

    fn result(pairs: &[(&str, f32)]) -> ClassificationResult {
        ClassificationResult::new(
            pairs
                .iter()
                .map(|(label, score)| Prediction::new(*label, *score))
                .collect(),
        )
    }

    #[test]
    fn test_tier_boundaries_belong_to_lower_tier() {
        assert_eq!(tier_of(0.0), ConfidenceTier::Unclear);
        assert_eq!(tier_of(0.3), ConfidenceTier::Unclear);
        assert_eq!(tier_of(0.300_001), ConfidenceTier::Low);
        assert_eq!(tier_of(0.5), ConfidenceTier::Low);
        assert_eq!(tier_of(0.500_001), ConfidenceTier::Medium);
        assert_eq!(tier_of(0.7), ConfidenceTier::Medium);
        assert_eq!(tier_of(0.700_001), ConfidenceTier::High);
        assert_eq!(tier_of(0.9), ConfidenceTier::High);
        assert_eq!(tier_of(0.900_001), ConfidenceTier::VeryHigh);
        assert_eq!(tier_of(1.0), ConfidenceTier::VeryHigh);
    }

    #[test]
    fn test_tier_is_monotonic_step_function() {
        let mut previous = tier_of(0.0);
        for i in 0..=10_000 {
            let tier = tier_of(i as f32 / 10_000.0);
            assert!(tier >= previous, "tier decreased at {}", i);
            previous = tier;
        }
        assert_eq!(previous, ConfidenceTier::VeryHigh);
    }

    #[test]
    fn test_tier_out_of_range_and_nan() {
        assert_eq!(tier_of(-0.5), ConfidenceTier::Unclear);
        assert_eq!(tier_of(f32::NAN), ConfidenceTier::Unclear);
        assert_eq!(tier_of(1.5), ConfidenceTier::VeryHigh);
    }

    #[test]
    fn test_select_top_tie_prefers_canonical_order() {
        let top = select_top(&result(&[("sparrow", 0.62), ("finch", 0.62), ("robin", 0.10)]))
            .unwrap();
        assert_eq!(top.label, "sparrow");
        assert_eq!(top.score, 0.62);

        let top = select_top(&result(&[("finch", 0.62), ("sparrow", 0.62)])).unwrap();
        assert_eq!(top.label, "finch");
    }

    #[test]
    fn test_select_top_picks_maximum() {
        let top = select_top(&result(&[("robin", 0.1), ("owl", 0.7), ("wren", 0.2)])).unwrap();
        assert_eq!(top.label, "owl");
    }

    #[test]
    fn test_select_top_empty_is_error() {
        assert_eq!(
            select_top(&ClassificationResult::default()),
            Err(ConfidenceError::EmptyResult)
        );
    }

    #[test]
    fn test_select_top_skips_nan() {
        let top = select_top(&result(&[("ghost", f32::NAN), ("heron", 0.4)])).unwrap();
        assert_eq!(top.label, "heron");
    }

    #[test]
    fn test_unclear_message_omits_label() {
        let message = render_message("sparrow", ConfidenceTier::Unclear);
        assert!(!message.contains("sparrow"));
        assert_eq!(message, UNCLEAR_MESSAGE);
    }

    #[test]
    fn test_very_high_message_names_label_and_qualifier() {
        let message = render_message("sparrow", ConfidenceTier::VeryHigh);
        assert!(message.contains("sparrow"));
        assert!(message.contains("very high"));
    }

    #[test]
    fn test_every_named_tier_has_distinct_qualifier() {
        let tiers = [
            ConfidenceTier::Low,
            ConfidenceTier::Medium,
            ConfidenceTier::High,
            ConfidenceTier::VeryHigh,
        ];
        for tier in tiers {
            let message = render_message("kestrel", tier);
            assert!(message.contains("kestrel"));
            assert!(message.contains(tier.qualifier().unwrap()));
        }
    }
}
