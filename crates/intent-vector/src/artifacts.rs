//! Index artifacts on disk.
//!
//! An artifacts directory holds two files that must agree in length and order:
//! - `intent_embeddings.json`: `{"X": [[f32, ...], ...]}`
//! - `intent_labels.json`: `["LABEL", ...]`

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::VectorError;
use crate::store::VectorStore;

/// Embedding matrix file name
pub const EMBEDDINGS_FILE: &str = "intent_embeddings.json";

/// Label list file name
pub const LABELS_FILE: &str = "intent_labels.json";

#[derive(Debug, Serialize, Deserialize)]
struct EmbeddingMatrix {
    #[serde(rename = "X")]
    x: Vec<Vec<f32>>,
}

/// Load a vector store from an artifacts directory.
///
/// Missing files, malformed JSON, a length mismatch or ragged vectors are
/// all fatal.
pub fn load_artifacts(dir: impl AsRef<Path>) -> Result<VectorStore, VectorError> {
    let dir = dir.as_ref();
    let embeddings_path = dir.join(EMBEDDINGS_FILE);
    let labels_path = dir.join(LABELS_FILE);

    for path in [&embeddings_path, &labels_path] {
        if !path.exists() {
            return Err(VectorError::MissingArtifact(path.clone()));
        }
    }

    let matrix: EmbeddingMatrix = serde_json::from_slice(&fs::read(&embeddings_path)?)
        .map_err(|e| VectorError::Serialization(format!("{}: {}", EMBEDDINGS_FILE, e)))?;
    let labels: Vec<String> = serde_json::from_slice(&fs::read(&labels_path)?)
        .map_err(|e| VectorError::Serialization(format!("{}: {}", LABELS_FILE, e)))?;

    let store = VectorStore::new(matrix.x, labels)?;
    info!(path = ?dir, count = store.len(), dim = store.dimension(), "Loaded index artifacts");
    Ok(store)
}

/// Write a vector store to an artifacts directory, creating it if needed.
pub fn save_artifacts(store: &VectorStore, dir: impl AsRef<Path>) -> Result<(), VectorError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let matrix = EmbeddingMatrix {
        x: store.vectors().to_vec(),
    };
    let embeddings =
        serde_json::to_vec(&matrix).map_err(|e| VectorError::Serialization(e.to_string()))?;
    let labels = serde_json::to_string_pretty(store.labels())
        .map_err(|e| VectorError::Serialization(e.to_string()))?;

    fs::write(dir.join(EMBEDDINGS_FILE), embeddings)?;
    fs::write(dir.join(LABELS_FILE), labels)?;

    info!(path = ?dir, count = store.len(), "Saved index artifacts");
    Ok(())
}
