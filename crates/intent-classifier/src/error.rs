//! Classifier error types.

use thiserror::Error;

/// Errors that can occur during classification.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Vector store error (including querying an empty store)
    #[error("Vector store error: {0}")]
    Vector(#[from] intent_vector::VectorError),

    /// Encoder error
    #[error("Embedding error: {0}")]
    Embedding(#[from] intent_embeddings::EmbeddingError),

    /// Threshold outside [0, 1]
    #[error("Invalid threshold: {0} (must be 0.0-1.0)")]
    InvalidThreshold(f32),

    /// Parallel arrays of different lengths
    #[error("Length mismatch: {truth} true labels, {predicted} predictions, {scores} scores")]
    LengthMismatch {
        truth: usize,
        predicted: usize,
        scores: usize,
    },

    /// Store returned an index with no label
    #[error("No label at index {0}")]
    MissingLabel(usize),
}
