//! Example and prediction types.

use serde::{Deserialize, Serialize};

/// Sentinel label meaning "no confident match found".
///
/// Never a trained class: it is excluded from per-class scoring but is a
/// valid prediction outcome.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Check whether a label is the `unknown` sentinel.
pub fn is_unknown(label: &str) -> bool {
    label == UNKNOWN_LABEL
}

/// A labelled example stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Unit-normalized embedding vector
    pub vector: Vec<f32>,
    /// Intent label
    pub label: String,
}

impl Example {
    pub fn new(vector: Vec<f32>, label: impl Into<String>) -> Self {
        Self {
            vector,
            label: label.into(),
        }
    }
}

/// Result of classifying one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted intent, possibly [`UNKNOWN_LABEL`]
    pub label: String,
    /// Cosine similarity of the nearest example (0.0 for empty input)
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// The result for input that normalizes to nothing.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_LABEL, 0.0)
    }

    /// Unknown with a retained similarity score (rejected match).
    pub fn rejected(score: f32) -> Self {
        Self::new(UNKNOWN_LABEL, score)
    }

    pub fn is_unknown(&self) -> bool {
        is_unknown(&self.label)
    }
}
