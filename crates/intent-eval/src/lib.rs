//! # intent-eval
//!
//! Offline evaluation for the intent classifier.
//!
//! Runs the classifier over a labelled dataset, calibrates the rejection
//! threshold on the raw (pre-threshold) predictions, re-applies the best
//! threshold, and aggregates per-class metrics, a confusion matrix and ranked
//! error lists into an [`EvaluationReport`].
//!
//! ## Modules
//!
//! - [`dataset`]: CSV loading (`text`, `intent_true`), dropping incomplete rows
//! - [`metrics`]: per-class statistics, confusion matrix, classification report
//! - [`evaluator`]: the evaluation pipeline and report value
//! - [`render`]: plain-text report rendering

pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod render;

pub use dataset::{load_dataset, EvalRow};
pub use error::EvalError;
pub use evaluator::{
    EvaluatedExample, EvaluationReport, Evaluator, HighConfidenceExample, Misclassification,
    ScoreStats,
};
pub use metrics::{ClassStats, ClassificationReport, ConfusionMatrix, LabelMetrics};
pub use render::{render_report, write_report, ReportContext};
