//! Evaluation error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// No rows left to evaluate
    #[error("Evaluation dataset is empty")]
    EmptyDataset,

    /// Dataset file could not be read or lacks required columns
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Classifier error: {0}")]
    Classifier(#[from] intent_classifier::ClassifierError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
