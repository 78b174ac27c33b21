//! Mock embedder for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Mock embedder that maps known texts to fixed vectors.
///
/// Useful for testing without loading a model. Unknown texts fall back to
/// the configured fallback vector, or fail with `InvalidInput` if none is set.
/// Every call is counted so tests can assert the model was never touched.
pub struct MockEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Option<Vec<f32>>,
    calls: AtomicUsize,
    info: ModelInfo,
}

impl MockEmbedder {
    /// Create a mock producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback: None,
            calls: AtomicUsize::new(0),
            info: ModelInfo {
                name: "mock".to_string(),
                dimension,
                max_sequence_length: usize::MAX,
            },
        }
    }

    /// Register the vector returned for `text` (normalized on output).
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    /// Vector returned for texts that were not registered.
    pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
        self.fallback = Some(vector);
        self
    }

    /// Number of texts embedded so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingModel for MockEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let values = self
            .vectors
            .get(text)
            .or(self.fallback.as_ref())
            .ok_or_else(|| EmbeddingError::InvalidInput(format!("no mock vector for '{}'", text)))?;

        if values.len() != self.info.dimension {
            return Err(EmbeddingError::InvalidInput(format!(
                "mock vector for '{}' has dimension {}, expected {}",
                text,
                values.len(),
                self.info.dimension
            )));
        }
        Ok(Embedding::new(values.clone()))
    }
}
