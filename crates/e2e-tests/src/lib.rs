//! End-to-end test infrastructure for intent-nn.
//!
//! Provides a shared TestHarness, a deterministic keyword encoder and CSV
//! fixtures for tests covering build-index -> classify -> evaluate -> report.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use intent_classifier::Classifier;
use intent_embeddings::{
    DefaultNormalizer, Embedding, EmbeddingError, EmbeddingModel, ModelInfo, TextNormalizer,
};
use intent_vector::{load_training_rows, BuildStats, IndexBuilder};

/// Keyword groups, one embedding axis each. The last axis is a constant bias.
const KEYWORD_AXES: [(&str, &[&str]); 3] = [
    ("FLIGHT", &["flight", "fly", "plane", "bay"]),
    ("CANCEL", &["cancel", "refund"]),
    ("WEATHER", &["weather", "rain", "forecast"]),
];

/// Bias shared by every text, so keyword-free input still has a direction.
const BIAS: f32 = 0.3;

/// Deterministic encoder: one axis per keyword group plus a bias axis.
///
/// A text with keywords from a single group has cosine 1.0 with any other
/// text from that group and about 0.29 with keyword-free text.
pub struct KeywordEmbedder {
    info: ModelInfo,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            info: ModelInfo {
                name: "keyword".to_string(),
                dimension: KEYWORD_AXES.len() + 1,
                max_sequence_length: usize::MAX,
            },
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of texts embedded so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingModel for KeywordEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut values = vec![0.0; self.info.dimension];
        for word in text.split_whitespace() {
            for (axis, (_, words)) in KEYWORD_AXES.iter().enumerate() {
                if words.contains(&word) {
                    values[axis] = 1.0;
                }
            }
        }
        values[KEYWORD_AXES.len()] = BIAS;
        Ok(Embedding::new(values))
    }
}

/// Training set, including a Vietnamese utterance and one row that
/// normalizes to nothing.
pub const TRAINING_CSV: &str = "\
utterance,intent
Book a flight to Hanoi,FLIGHT
I want to fly tomorrow,FLIGHT
đặt vé máy bay,FLIGHT
Cancel my booking,CANCEL
I need a refund,CANCEL
What's the weather like?,WEATHER
Will it rain today,WEATHER
???,WEATHER
";

/// Labelled evaluation set; the last rows are out-of-scope or mislabelled.
pub const EVAL_CSV: &str = "\
id,text,intent_true
1,Find me a plane ticket,FLIGHT
2,FLY ME TO DA NANG!,FLIGHT
3,please refund me,CANCEL
4,cancel it,CANCEL
5,weather forecast for Hue,WEATHER
6,tell me a joke,unknown
7,sing a song,unknown
8,rain or shine,CANCEL
9,,FLIGHT
";

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Written by [`TestHarness::build_index`]
    pub artifacts_dir: PathBuf,
    pub training_csv: PathBuf,
    pub eval_csv: PathBuf,
    pub embedder: Arc<KeywordEmbedder>,
}

impl TestHarness {
    /// Create a harness with the fixture CSVs written to a temp directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let artifacts_dir = temp_dir.path().join("artifacts");
        let training_csv = temp_dir.path().join("intent_prepared.csv");
        let eval_csv = temp_dir.path().join("intent_eval.csv");

        std::fs::write(&training_csv, TRAINING_CSV).expect("Failed to write training CSV");
        std::fs::write(&eval_csv, EVAL_CSV).expect("Failed to write eval CSV");

        Self {
            _temp_dir: temp_dir,
            artifacts_dir,
            training_csv,
            eval_csv,
            embedder: Arc::new(KeywordEmbedder::new()),
        }
    }

    pub fn normalizer(&self) -> Arc<dyn TextNormalizer> {
        Arc::new(DefaultNormalizer::new())
    }

    /// Build the index from the training CSV into `artifacts_dir`.
    pub fn build_index(&self) -> BuildStats {
        let rows = load_training_rows(&self.training_csv).expect("Failed to read training rows");
        IndexBuilder::new(self.embedder.clone(), self.normalizer())
            .build_to_dir(&rows, &self.artifacts_dir)
            .expect("Failed to build index")
    }

    /// Load a classifier from the artifacts written by [`Self::build_index`].
    pub fn classifier(&self) -> Classifier {
        Classifier::from_artifacts(&self.artifacts_dir, self.embedder.clone(), self.normalizer())
            .expect("Failed to load classifier")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
