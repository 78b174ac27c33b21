//! Vector store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during vector operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Query against a store with no examples
    #[error("Vector store is empty")]
    EmptyStore,

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Vector and label arrays differ in length
    #[error("Length mismatch: {vectors} vectors, {labels} labels")]
    LengthMismatch { vectors: usize, labels: usize },

    /// Artifact file missing
    #[error("Artifact not found: {0}")]
    MissingArtifact(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Training data error
    #[error("Training data error: {0}")]
    TrainingData(String),

    /// Embedding error
    #[error("Embedding error: {0}")]
    Embedding(#[from] intent_embeddings::EmbeddingError),
}
