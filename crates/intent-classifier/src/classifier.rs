//! Nearest-neighbour intent classification.
//!
//! This module implements the `Classifier`, which normalizes an utterance,
//! encodes it, looks up the closest indexed example, and accepts the
//! example's label only when the similarity clears the threshold.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use intent_embeddings::{EmbeddingModel, TextNormalizer};
use intent_types::{Prediction, Settings};
use intent_vector::{load_artifacts, VectorStore};

use crate::decision::DecisionRule;
use crate::error::ClassifierError;

/// Intent classifier over a read-only vector store.
///
/// The encoder and normalizer are explicitly owned handles passed in at
/// construction. The threshold lives here, not in the store, and can be
/// changed between calls.
pub struct Classifier {
    store: VectorStore,
    embedder: Arc<dyn EmbeddingModel>,
    normalizer: Arc<dyn TextNormalizer>,
    rule: DecisionRule,
}

impl Classifier {
    /// Create a classifier with the default threshold (0.55).
    pub fn new(
        store: VectorStore,
        embedder: Arc<dyn EmbeddingModel>,
        normalizer: Arc<dyn TextNormalizer>,
    ) -> Self {
        Self {
            store,
            embedder,
            normalizer,
            rule: DecisionRule::default(),
        }
    }

    /// Load the store from an artifacts directory.
    pub fn from_artifacts(
        dir: impl AsRef<Path>,
        embedder: Arc<dyn EmbeddingModel>,
        normalizer: Arc<dyn TextNormalizer>,
    ) -> Result<Self, ClassifierError> {
        let store = load_artifacts(dir)?;
        info!(
            examples = store.len(),
            intents = store.distinct_labels().len(),
            model = %embedder.info().name,
            "Classifier ready"
        );
        Ok(Self::new(store, embedder, normalizer))
    }

    /// Load from the configured artifacts directory and apply the configured
    /// threshold.
    pub fn from_settings(
        settings: &Settings,
        embedder: Arc<dyn EmbeddingModel>,
        normalizer: Arc<dyn TextNormalizer>,
    ) -> Result<Self, ClassifierError> {
        Self::from_artifacts(settings.expanded_artifacts_dir(), embedder, normalizer)?
            .with_threshold(settings.threshold)
    }

    /// Builder-style threshold override.
    pub fn with_threshold(mut self, threshold: f32) -> Result<Self, ClassifierError> {
        self.set_threshold(threshold)?;
        Ok(self)
    }

    pub fn threshold(&self) -> f32 {
        self.rule.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) -> Result<(), ClassifierError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ClassifierError::InvalidThreshold(threshold));
        }
        self.rule = DecisionRule::new(threshold);
        Ok(())
    }

    pub fn rule(&self) -> DecisionRule {
        self.rule
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Classify an utterance: the nearest label if its similarity clears the
    /// threshold, otherwise `unknown` with the similarity kept as the score.
    ///
    /// Input that normalizes to nothing returns (`unknown`, 0.0) without
    /// touching the encoder or the store.
    pub fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let raw = self.classify_raw(text)?;
        if self.rule.accepts(raw.score) || raw.is_unknown() {
            Ok(raw)
        } else {
            Ok(Prediction::rejected(raw.score))
        }
    }

    /// Label-only form of [`Self::classify`].
    pub fn predict(&self, text: &str) -> Result<String, ClassifierError> {
        Ok(self.classify(text)?.label)
    }

    /// Nearest label and similarity before the threshold is applied.
    pub fn classify_raw(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let Some(normalized) = self.normalize(text) else {
            debug!("Empty input after normalization");
            return Ok(Prediction::unknown());
        };

        let embedding = self.embedder.embed(&normalized)?;
        self.lookup(embedding.as_slice())
    }

    /// [`Self::classify_raw`] over many utterances with one batched encode.
    ///
    /// Output order matches input order.
    pub fn classify_raw_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<Prediction>, ClassifierError> {
        let normalized: Vec<Option<String>> =
            texts.iter().map(|t| self.normalize(t.as_ref())).collect();
        let to_encode: Vec<&str> = normalized.iter().flatten().map(String::as_str).collect();

        debug!(total = texts.len(), encoded = to_encode.len(), "Classifying batch");
        let embeddings = self.embedder.embed_batch(&to_encode)?;
        if embeddings.len() != to_encode.len() {
            return Err(intent_embeddings::EmbeddingError::BatchMismatch {
                sent: to_encode.len(),
                received: embeddings.len(),
            }
            .into());
        }

        let mut embeddings = embeddings.into_iter();
        normalized
            .iter()
            .map(|n| match n {
                Some(_) => match embeddings.next() {
                    Some(embedding) => self.lookup(embedding.as_slice()),
                    None => Err(intent_embeddings::EmbeddingError::BatchMismatch {
                        sent: to_encode.len(),
                        received: 0,
                    }
                    .into()),
                },
                None => Ok(Prediction::unknown()),
            })
            .collect()
    }

    fn normalize(&self, text: &str) -> Option<String> {
        self.normalizer.normalize(text).filter(|n| !n.is_empty())
    }

    fn lookup(&self, vector: &[f32]) -> Result<Prediction, ClassifierError> {
        let hit = self.store.nearest(vector)?;
        let label = self
            .store
            .label_at(hit.index)
            .ok_or(ClassifierError::MissingLabel(hit.index))?;
        // Opposed vectors score 0, not negative
        let score = hit.similarity.max(0.0);
        debug!(label = label, score = score, "Nearest example");
        Ok(Prediction::new(label, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_embeddings::{DefaultNormalizer, MockEmbedder};
    use intent_types::UNKNOWN_LABEL;
    use intent_vector::{save_artifacts, VectorError};

    /// FLIGHT, CANCEL and WEATHER on orthogonal axes.
    fn store() -> VectorStore {
        VectorStore::new(
            vec![
                vec![1.0, 0.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            vec!["FLIGHT".into(), "CANCEL".into(), "WEATHER".into()],
        )
        .unwrap()
    }

    fn embedder() -> Arc<MockEmbedder> {
        // cos 0.9 with FLIGHT
        let near_flight = vec![0.9, (1.0f32 - 0.81).sqrt(), 0.0, 0.0];
        // cos 0.3 with every intent
        let equidistant = vec![0.3, 0.3, 0.3, (1.0f32 - 0.27).sqrt()];
        Arc::new(
            MockEmbedder::new(4)
                .with_vector("flight booking please", near_flight)
                .with_vector("tell me a joke", equidistant)
                .with_fallback(vec![0.0, 0.0, 1.0, 0.0]),
        )
    }

    fn classifier_with(embedder: Arc<MockEmbedder>) -> Classifier {
        Classifier::new(store(), embedder, Arc::new(DefaultNormalizer::new()))
    }

    #[test]
    fn test_confident_match() {
        let c = classifier_with(embedder());
        let p = c.classify("Flight booking, please!").unwrap();
        assert_eq!(p.label, "FLIGHT");
        assert!((p.score - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_low_similarity_is_unknown_with_score() {
        let c = classifier_with(embedder());
        let p = c.classify("tell me a joke").unwrap();
        assert_eq!(p.label, UNKNOWN_LABEL);
        assert!((p.score - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_empty_input_short_circuits() {
        let mock = embedder();
        let c = classifier_with(mock.clone());
        for text in ["", "   ", "?!?"] {
            assert_eq!(c.classify(text).unwrap(), Prediction::unknown());
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_empty_input_independent_of_store() {
        let empty = VectorStore::new(vec![], vec![]).unwrap();
        let c = Classifier::new(empty, embedder(), Arc::new(DefaultNormalizer::new()));
        assert_eq!(c.classify("...").unwrap(), Prediction::unknown());
    }

    #[test]
    fn test_empty_store_is_an_error() {
        let empty = VectorStore::new(vec![], vec![]).unwrap();
        let c = Classifier::new(empty, embedder(), Arc::new(DefaultNormalizer::new()));
        assert!(matches!(
            c.classify("flight booking please"),
            Err(ClassifierError::Vector(VectorError::EmptyStore))
        ));
    }

    #[test]
    fn test_threshold_is_mutable() {
        let mut c = classifier_with(embedder());
        c.set_threshold(0.95).unwrap();
        assert_eq!(c.predict("flight booking please").unwrap(), UNKNOWN_LABEL);
        c.set_threshold(0.5).unwrap();
        assert_eq!(c.predict("flight booking please").unwrap(), "FLIGHT");
        assert!(c.set_threshold(1.5).is_err());
    }

    #[test]
    fn test_classify_raw_ignores_threshold() {
        let c = classifier_with(embedder()).with_threshold(1.0).unwrap();
        let raw = c.classify_raw("flight booking please").unwrap();
        assert_eq!(raw.label, "FLIGHT");
        assert_eq!(c.classify("flight booking please").unwrap().label, UNKNOWN_LABEL);
    }

    #[test]
    fn test_batch_matches_single_and_keeps_order() {
        let mock = embedder();
        let c = classifier_with(mock.clone());
        let texts = ["tell me a joke", "", "flight booking please", "anything else"];
        let batch = c.classify_raw_batch(&texts).unwrap();

        assert_eq!(batch.len(), 4);
        assert_eq!(batch[1], Prediction::unknown());
        assert_eq!(batch[2].label, "FLIGHT");
        assert_eq!(batch[3].label, "WEATHER");
        // Empty text was never encoded
        assert_eq!(mock.call_count(), 3);

        for (text, pred) in texts.iter().zip(&batch) {
            assert_eq!(&c.classify_raw(text).unwrap(), pred);
        }
    }

    #[test]
    fn test_scores_in_range_and_labels_known() {
        let c = classifier_with(embedder());
        for text in ["flight booking please", "tell me a joke", "zzz", ""] {
            let p = c.classify(text).unwrap();
            assert!((0.0..=1.0).contains(&p.score));
            assert!(p.is_unknown() || c.store().distinct_labels().contains(p.label.as_str()));
        }
    }

    #[test]
    fn test_opposed_query_scores_zero() {
        let store = VectorStore::new(vec![vec![1.0, 0.0]], vec!["A".into()]).unwrap();
        let embedder = Arc::new(MockEmbedder::new(2).with_fallback(vec![-1.0, 0.0]));
        let mut c = Classifier::new(store, embedder, Arc::new(DefaultNormalizer::new()));

        let raw = c.classify_raw("anything").unwrap();
        assert_eq!(raw, Prediction::new("A", 0.0));

        let p = c.classify("anything").unwrap();
        assert_eq!(p.label, UNKNOWN_LABEL);
        assert!((0.0..=1.0).contains(&p.score));

        // A zero threshold accepts every non-empty query
        c.set_threshold(0.0).unwrap();
        assert_eq!(c.predict("anything").unwrap(), "A");
    }

    #[test]
    fn test_from_artifacts() {
        let temp = tempfile::TempDir::new().unwrap();
        save_artifacts(&store(), temp.path()).unwrap();
        let c = Classifier::from_artifacts(
            temp.path(),
            embedder(),
            Arc::new(DefaultNormalizer::new()),
        )
        .unwrap();
        assert_eq!(c.store().len(), 3);
        assert!((c.threshold() - 0.55).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_settings_uses_dir_and_threshold() {
        let temp = tempfile::TempDir::new().unwrap();
        save_artifacts(&store(), temp.path()).unwrap();
        let settings = Settings {
            artifacts_dir: temp.path().to_string_lossy().into_owned(),
            threshold: 0.95,
            ..Settings::default()
        };

        let c = Classifier::from_settings(&settings, embedder(), Arc::new(DefaultNormalizer::new()))
            .unwrap();
        assert_eq!(c.store().len(), 3);
        assert!((c.threshold() - 0.95).abs() < f32::EPSILON);
        assert_eq!(c.predict("flight booking please").unwrap(), UNKNOWN_LABEL);
    }

    #[test]
    fn test_from_settings_rejects_bad_threshold() {
        let temp = tempfile::TempDir::new().unwrap();
        save_artifacts(&store(), temp.path()).unwrap();
        let settings = Settings {
            artifacts_dir: temp.path().to_string_lossy().into_owned(),
            threshold: 1.5,
            ..Settings::default()
        };
        assert!(matches!(
            Classifier::from_settings(&settings, embedder(), Arc::new(DefaultNormalizer::new())),
            Err(ClassifierError::InvalidThreshold(_))
        ));
    }
}
