//! Offline index construction.
//!
//! Normalizes labelled utterances, embeds them in one batch, and produces a
//! [`VectorStore`] (optionally written out as artifacts).

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use intent_embeddings::{EmbeddingModel, TextNormalizer};

use crate::artifacts::save_artifacts;
use crate::error::VectorError;
use crate::store::VectorStore;

/// One labelled training utterance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainingRow {
    pub utterance: String,
    pub intent: String,
}

impl TrainingRow {
    pub fn new(utterance: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            intent: intent.into(),
        }
    }
}

/// Read training rows from a CSV with `utterance` and `intent` columns.
pub fn load_training_rows(path: impl AsRef<Path>) -> Result<Vec<TrainingRow>, VectorError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| VectorError::TrainingData(format!("{}: {}", path.display(), e)))?;

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<TrainingRow>, _>>()
        .map_err(|e| VectorError::TrainingData(format!("{}: {}", path.display(), e)))?;

    info!(path = ?path, count = rows.len(), "Loaded training rows");
    Ok(rows)
}

/// Statistics from an index build
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    /// Rows read
    pub rows: usize,
    /// Examples embedded into the store
    pub indexed: usize,
    /// Rows dropped because their text normalized to nothing
    pub skipped: usize,
}

/// Builds a vector store from training rows.
pub struct IndexBuilder {
    embedder: Arc<dyn EmbeddingModel>,
    normalizer: Arc<dyn TextNormalizer>,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn EmbeddingModel>, normalizer: Arc<dyn TextNormalizer>) -> Self {
        Self {
            embedder,
            normalizer,
        }
    }

    /// Embed every row whose utterance survives normalization.
    pub fn build(&self, rows: &[TrainingRow]) -> Result<(VectorStore, BuildStats), VectorError> {
        let mut stats = BuildStats {
            rows: rows.len(),
            ..Default::default()
        };

        let mut texts = Vec::with_capacity(rows.len());
        let mut labels = Vec::with_capacity(rows.len());
        for row in rows {
            match self.normalizer.normalize(&row.utterance) {
                Some(text) => {
                    texts.push(text);
                    labels.push(row.intent.clone());
                }
                None => {
                    warn!(utterance = %row.utterance, "Skipping row with empty normalized text");
                    stats.skipped += 1;
                }
            }
        }

        let embeddings = self.embedder.embed_texts(&texts)?;
        let vectors = embeddings.into_iter().map(|e| e.into_vec()).collect();
        let store = VectorStore::new(vectors, labels)?;
        stats.indexed = store.len();

        info!(
            indexed = stats.indexed,
            skipped = stats.skipped,
            model = %self.embedder.info().name,
            "Built intent index"
        );
        Ok((store, stats))
    }

    /// Build and write artifacts to `dir`.
    pub fn build_to_dir(
        &self,
        rows: &[TrainingRow],
        dir: impl AsRef<Path>,
    ) -> Result<BuildStats, VectorError> {
        let (store, stats) = self.build(rows)?;
        save_artifacts(&store, dir)?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::load_artifacts;
    use intent_embeddings::{DefaultNormalizer, MockEmbedder};
    use std::io::Write;
    use tempfile::TempDir;

    fn builder() -> IndexBuilder {
        let embedder = MockEmbedder::new(3)
            .with_vector("book a flight", vec![1.0, 0.0, 0.0])
            .with_vector("cancel my order", vec![0.0, 2.0, 0.0])
            .with_vector("what s the weather", vec![0.0, 0.0, 1.0]);
        IndexBuilder::new(Arc::new(embedder), Arc::new(DefaultNormalizer::new()))
    }

    fn rows() -> Vec<TrainingRow> {
        vec![
            TrainingRow::new("Book a flight!", "FLIGHT"),
            TrainingRow::new("Cancel my order", "CANCEL"),
            TrainingRow::new("???", "NOISE"),
            TrainingRow::new("What's the weather", "WEATHER"),
        ]
    }

    #[test]
    fn test_build_normalizes_and_skips_empty() {
        let (store, stats) = builder().build(&rows()).unwrap();
        assert_eq!(
            stats,
            BuildStats {
                rows: 4,
                indexed: 3,
                skipped: 1
            }
        );
        assert_eq!(store.labels(), &["FLIGHT", "CANCEL", "WEATHER"]);
        // Mock output is normalized to unit length
        assert!((store.vector_at(1).unwrap()[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_build_to_dir_round_trips() {
        let temp = TempDir::new().unwrap();
        builder().build_to_dir(&rows(), temp.path()).unwrap();
        let store = load_artifacts(temp.path()).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_load_training_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "utterance,intent").unwrap();
        writeln!(file, "\"book a flight, please\",FLIGHT").unwrap();
        writeln!(file, "cancel my order,CANCEL").unwrap();

        let rows = load_training_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], TrainingRow::new("book a flight, please", "FLIGHT"));
    }

    #[test]
    fn test_load_training_rows_padded_header() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, " utterance , intent").unwrap();
        writeln!(file, "hello there,GREET").unwrap();

        let rows = load_training_rows(file.path()).unwrap();
        assert_eq!(rows, vec![TrainingRow::new("hello there", "GREET")]);
    }

    #[test]
    fn test_load_training_rows_missing_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "text,label").unwrap();
        writeln!(file, "hello,GREET").unwrap();
        assert!(matches!(
            load_training_rows(file.path()),
            Err(VectorError::TrainingData(_))
        ));
    }
}
