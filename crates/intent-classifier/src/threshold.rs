//! Rejection threshold calibration.
//!
//! Sweeps thresholds `0.00, 0.01, ..., 1.00` over held-out predictions and
//! keeps the one with the greatest micro-averaged F1. Pure: no store or
//! encoder access, just three parallel slices.

use serde::{Deserialize, Serialize};
use tracing::debug;

use intent_types::is_unknown;

use crate::decision::DecisionRule;
use crate::error::ClassifierError;

/// Number of grid intervals; thresholds are `i / GRID_STEPS` for `i in 0..=GRID_STEPS`.
pub const GRID_STEPS: u32 = 100;

/// Best threshold found by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSearchResult {
    pub threshold: f32,
    pub f1: f64,
}

/// Metrics at one grid threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub threshold: f32,
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Grid-search threshold optimizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdOptimizer;

impl ThresholdOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Candidate thresholds in ascending order.
    pub fn grid() -> impl Iterator<Item = f32> {
        (0..=GRID_STEPS).map(|i| i as f32 / GRID_STEPS as f32)
    }

    /// Threshold with the strictly greatest F1; the first (lowest) wins ties.
    ///
    /// Returns threshold 0.0 with F1 0.0 when nothing is ever correct.
    /// The three slices must have equal length; see [`Self::try_search`].
    pub fn search<T, P>(&self, truth: &[T], predicted: &[P], scores: &[f32]) -> ThresholdSearchResult
    where
        T: AsRef<str>,
        P: AsRef<str>,
    {
        let mut best = ThresholdSearchResult {
            threshold: 0.0,
            f1: 0.0,
        };
        for point in self.sweep(truth, predicted, scores) {
            if point.f1 > best.f1 {
                best = ThresholdSearchResult {
                    threshold: point.threshold,
                    f1: point.f1,
                };
            }
        }

        debug!(threshold = best.threshold, f1 = best.f1, "Threshold search complete");
        best
    }

    /// [`Self::search`] with a length check on the parallel slices.
    pub fn try_search<T, P>(
        &self,
        truth: &[T],
        predicted: &[P],
        scores: &[f32],
    ) -> Result<ThresholdSearchResult, ClassifierError>
    where
        T: AsRef<str>,
        P: AsRef<str>,
    {
        if truth.len() != predicted.len() || truth.len() != scores.len() {
            return Err(ClassifierError::LengthMismatch {
                truth: truth.len(),
                predicted: predicted.len(),
                scores: scores.len(),
            });
        }
        Ok(self.search(truth, predicted, scores))
    }

    /// Metrics at every grid threshold, ascending.
    pub fn sweep<T, P>(&self, truth: &[T], predicted: &[P], scores: &[f32]) -> Vec<SweepPoint>
    where
        T: AsRef<str>,
        P: AsRef<str>,
    {
        Self::grid()
            .map(|threshold| evaluate_at(threshold, truth, predicted, scores))
            .collect()
    }
}

/// Pooled counts across all non-unknown classes at one threshold.
fn evaluate_at<T, P>(threshold: f32, truth: &[T], predicted: &[P], scores: &[f32]) -> SweepPoint
where
    T: AsRef<str>,
    P: AsRef<str>,
{
    let rule = DecisionRule::new(threshold);
    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);

    for ((t, p), &score) in truth.iter().zip(predicted).zip(scores) {
        let t = t.as_ref();
        let effective = rule.apply(p.as_ref(), score);
        if effective == t {
            if !is_unknown(t) {
                tp += 1;
            }
        } else {
            if !is_unknown(effective) {
                fp += 1;
            }
            if !is_unknown(t) {
                fn_ += 1;
            }
        }
    }

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    SweepPoint {
        threshold,
        true_positive: tp,
        false_positive: fp,
        false_negative: fn_,
        precision,
        recall,
        f1: harmonic_mean(precision, recall),
    }
}

/// `num / den`, or 0 when `den == 0`.
pub fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// F1 from precision and recall, 0 when both are 0.
pub fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}
