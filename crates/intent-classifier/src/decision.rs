//! Accept/reject decision for a nearest-neighbour match.

use serde::{Deserialize, Serialize};

use intent_types::{config::DEFAULT_THRESHOLD, UNKNOWN_LABEL};

/// Threshold rule: keep the matched label when `score >= threshold`,
/// otherwise answer `unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionRule {
    pub threshold: f32,
}

impl Default for DecisionRule {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl DecisionRule {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn accepts(&self, score: f32) -> bool {
        score >= self.threshold
    }

    /// Effective label for a raw match.
    pub fn apply<'a>(&self, label: &'a str, score: f32) -> &'a str {
        if self.accepts(score) {
            label
        } else {
            UNKNOWN_LABEL
        }
    }

    /// Re-threshold a whole set of raw matches without re-encoding.
    pub fn apply_all<S: AsRef<str>>(&self, labels: &[S], scores: &[f32]) -> Vec<String> {
        labels
            .iter()
            .zip(scores)
            .map(|(label, &score)| self.apply(label.as_ref(), score).to_string())
            .collect()
    }
}
