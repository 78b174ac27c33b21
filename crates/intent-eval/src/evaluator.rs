//! Evaluation pipeline.
//!
//! 1. Raw (pre-threshold) prediction for every row, in one batched encode
//! 2. Threshold search over the raw predictions
//! 3. Best threshold re-applied to the same predictions
//! 4. Per-class statistics, confusion matrix and classification report
//! 5. Misclassifications ranked by descending score
//! 6. High-confidence examples for spot checks

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use intent_classifier::{Classifier, DecisionRule, ThresholdOptimizer, ThresholdSearchResult};
use intent_types::config::DEFAULT_HIGH_CONFIDENCE;
use intent_types::UNKNOWN_LABEL;

use crate::dataset::EvalRow;
use crate::error::EvalError;
use crate::metrics::{per_class_stats, ClassStats, ClassificationReport, ConfusionMatrix};

/// One evaluated row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedExample {
    pub text: String,
    pub true_label: String,
    /// Nearest label before the threshold
    pub raw_label: String,
    /// Label after applying the best threshold
    pub final_label: String,
    pub score: f32,
}

/// A row whose final label differs from the true label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Misclassification {
    pub text: String,
    pub true_label: String,
    pub predicted_label: String,
    pub score: f32,
}

/// A row whose raw match scored at or above the high-confidence cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighConfidenceExample {
    pub text: String,
    pub predicted_label: String,
    pub score: f32,
}

/// Summary of raw similarity scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub mean: f64,
    /// Upper median: element `len / 2` of the sorted scores
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n - 1); 0 for fewer than two scores
    pub std: f64,
}

impl ScoreStats {
    pub fn from_scores(scores: &[f32]) -> Self {
        if scores.is_empty() {
            return Self {
                mean: 0.0,
                median: 0.0,
                min: 0.0,
                max: 0.0,
                std: 0.0,
            };
        }

        let mut sorted: Vec<f64> = scores.iter().map(|&s| s as f64).collect();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std = if sorted.len() < 2 {
            0.0
        } else {
            (sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        };

        Self {
            mean,
            median: sorted[sorted.len() / 2],
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            std,
        }
    }
}

/// Everything one evaluation run produces. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub total_samples: usize,
    /// (intent, count) by descending count, then label
    pub intent_distribution: Vec<(String, usize)>,
    pub best: ThresholdSearchResult,
    /// Threshold the classifier was configured with
    pub default_threshold: f32,
    /// Final predictions equal to `unknown`
    pub unknown_predictions: usize,
    pub score_stats: ScoreStats,
    pub classification_report: ClassificationReport,
    pub class_stats: BTreeMap<String, ClassStats>,
    pub confusion: ConfusionMatrix,
    /// Most confident mistakes first
    pub misclassifications: Vec<Misclassification>,
    /// Dataset order
    pub high_confidence: Vec<HighConfidenceExample>,
    pub high_confidence_cutoff: f32,
    pub examples: Vec<EvaluatedExample>,
}

impl EvaluationReport {
    pub fn best_threshold(&self) -> f32 {
        self.best.threshold
    }

    pub fn unknown_rate(&self) -> f64 {
        if self.total_samples == 0 {
            0.0
        } else {
            self.unknown_predictions as f64 / self.total_samples as f64
        }
    }

    pub fn unique_intents(&self) -> usize {
        self.intent_distribution.len()
    }

    /// The `n` classes with the lowest F1 (ties by label).
    pub fn worst_classes(&self, n: usize) -> Vec<(&str, &ClassStats)> {
        let mut classes: Vec<(&str, &ClassStats)> = self
            .class_stats
            .iter()
            .map(|(label, stats)| (label.as_str(), stats))
            .collect();
        classes.sort_by(|a, b| a.1.f1.total_cmp(&b.1.f1));
        classes.truncate(n);
        classes
    }
}

/// Runs a classifier over a labelled dataset and calibrates its threshold.
pub struct Evaluator<'a> {
    classifier: &'a Classifier,
    optimizer: ThresholdOptimizer,
    high_confidence: f32,
}

impl<'a> Evaluator<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self {
            classifier,
            optimizer: ThresholdOptimizer::new(),
            high_confidence: DEFAULT_HIGH_CONFIDENCE,
        }
    }

    /// Score cutoff for the high-confidence list (default 0.8).
    pub fn with_high_confidence(mut self, cutoff: f32) -> Self {
        self.high_confidence = cutoff;
        self
    }

    pub fn evaluate(&self, dataset: &[EvalRow]) -> Result<EvaluationReport, EvalError> {
        if dataset.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        let texts: Vec<&str> = dataset.iter().map(|r| r.text.as_str()).collect();
        let truth: Vec<&str> = dataset.iter().map(|r| r.intent_true.as_str()).collect();

        let raw = self.classifier.classify_raw_batch(&texts)?;
        let raw_labels: Vec<&str> = raw.iter().map(|p| p.label.as_str()).collect();
        let scores: Vec<f32> = raw.iter().map(|p| p.score).collect();

        let best = self.optimizer.search(&truth, &raw_labels, &scores);
        let final_labels = DecisionRule::new(best.threshold).apply_all(&raw_labels, &scores);

        info!(
            samples = dataset.len(),
            best_threshold = best.threshold,
            f1 = best.f1,
            "Threshold calibrated"
        );

        let examples: Vec<EvaluatedExample> = dataset
            .iter()
            .zip(raw.iter().zip(&final_labels))
            .map(|(row, (pred, final_label))| EvaluatedExample {
                text: row.text.clone(),
                true_label: row.intent_true.clone(),
                raw_label: pred.label.clone(),
                final_label: final_label.clone(),
                score: pred.score,
            })
            .collect();

        let mut misclassifications: Vec<Misclassification> = examples
            .iter()
            .filter(|e| e.true_label != e.final_label)
            .map(|e| Misclassification {
                text: e.text.clone(),
                true_label: e.true_label.clone(),
                predicted_label: e.final_label.clone(),
                score: e.score,
            })
            .collect();
        // Stable: equal scores keep dataset order
        misclassifications.sort_by(|a, b| b.score.total_cmp(&a.score));

        let high_confidence = examples
            .iter()
            .filter(|e| e.score >= self.high_confidence)
            .map(|e| HighConfidenceExample {
                text: e.text.clone(),
                predicted_label: e.raw_label.clone(),
                score: e.score,
            })
            .collect();

        Ok(EvaluationReport {
            total_samples: dataset.len(),
            intent_distribution: distribution(&truth),
            best,
            default_threshold: self.classifier.threshold(),
            unknown_predictions: final_labels.iter().filter(|l| *l == UNKNOWN_LABEL).count(),
            score_stats: ScoreStats::from_scores(&scores),
            classification_report: ClassificationReport::from_predictions(&truth, &final_labels),
            class_stats: per_class_stats(&truth, &final_labels),
            confusion: ConfusionMatrix::from_predictions(&truth, &final_labels),
            misclassifications,
            high_confidence,
            high_confidence_cutoff: self.high_confidence,
            examples,
        })
    }
}

fn distribution(truth: &[&str]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in truth {
        *counts.entry(*label).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_embeddings::{DefaultNormalizer, MockEmbedder};
    use intent_vector::VectorStore;
    use std::sync::Arc;

    /// Unit vector with cosine `sim` to axis `axis` and the rest on axis 3.
    fn toward(axis: usize, sim: f32) -> Vec<f32> {
        let mut v = vec![0.0; 4];
        v[axis] = sim;
        v[3] = (1.0 - sim * sim).sqrt();
        v
    }

    fn classifier(embedder: MockEmbedder) -> Classifier {
        let store = VectorStore::new(
            vec![
                vec![1.0, 0.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            vec!["A".into(), "B".into(), "C".into()],
        )
        .unwrap();
        Classifier::new(store, Arc::new(embedder), Arc::new(DefaultNormalizer::new()))
    }

    /// 8 correct and 2 incorrect raw predictions, all scoring >= 0.6.
    fn plateau_fixture() -> (Classifier, Vec<EvalRow>) {
        let cases: [(&str, &str, usize, f32); 10] = [
            ("a one", "A", 0, 0.6),
            ("a two", "A", 0, 0.65),
            ("a three", "A", 0, 0.7),
            ("b one", "B", 1, 0.75),
            ("b two", "B", 1, 0.81),
            ("b three", "B", 1, 0.82),
            ("c one", "C", 2, 0.84),
            ("c two", "C", 2, 0.85),
            ("c wrong", "C", 0, 0.95),
            ("a wrong", "A", 1, 0.9),
        ];
        let mut embedder = MockEmbedder::new(4);
        let mut rows = Vec::new();
        for (text, label, axis, sim) in cases {
            embedder = embedder.with_vector(text, toward(axis, sim));
            rows.push(EvalRow::new(text, label));
        }
        (classifier(embedder), rows)
    }

    #[test]
    fn test_empty_dataset_is_error() {
        let (c, _) = plateau_fixture();
        assert!(matches!(
            Evaluator::new(&c).evaluate(&[]),
            Err(EvalError::EmptyDataset)
        ));
    }

    #[test]
    fn test_plateau_selects_lowest_threshold() {
        let (c, rows) = plateau_fixture();
        let report = Evaluator::new(&c).evaluate(&rows).unwrap();

        assert_eq!(report.best_threshold(), 0.0);
        assert!((report.best.f1 - 0.8).abs() < 1e-9);
        assert_eq!(report.unknown_predictions, 0);
        assert!((report.default_threshold - 0.55).abs() < f32::EPSILON);
        for e in &report.examples {
            assert_eq!(e.raw_label, e.final_label);
        }
    }

    #[test]
    fn test_misclassifications_ranked_by_score() {
        let (c, rows) = plateau_fixture();
        let report = Evaluator::new(&c).evaluate(&rows).unwrap();

        let texts: Vec<&str> = report.misclassifications.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["c wrong", "a wrong"]);
        assert_eq!(report.misclassifications[0].predicted_label, "A");
        assert!(report.misclassifications[0].score > report.misclassifications[1].score);
    }

    #[test]
    fn test_high_confidence_includes_errors_in_dataset_order() {
        let (c, rows) = plateau_fixture();
        let report = Evaluator::new(&c).evaluate(&rows).unwrap();

        let texts: Vec<&str> = report.high_confidence.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["b two", "b three", "c one", "c two", "c wrong", "a wrong"]);
    }

    #[test]
    fn test_per_class_and_confusion() {
        let (c, rows) = plateau_fixture();
        let report = Evaluator::new(&c).evaluate(&rows).unwrap();

        let a = report.class_stats["A"];
        assert_eq!((a.count, a.true_positive, a.false_positive, a.false_negative), (4, 3, 1, 1));
        assert_eq!(report.confusion.labels, vec!["A", "B", "C"]);
        assert_eq!(report.confusion.get("C", "A"), 1);
        assert_eq!(report.confusion.get("A", "B"), 1);
        assert_eq!(report.intent_distribution[0], ("A".to_string(), 4));
        assert_eq!(report.unique_intents(), 3);
    }

    #[test]
    fn test_best_threshold_rejects_low_score_errors() {
        let embedder = MockEmbedder::new(4)
            .with_vector("good a", toward(0, 0.9))
            .with_vector("good b", toward(1, 0.85))
            .with_vector("noise", toward(2, 0.405))
            .with_vector("wrong", toward(1, 0.305));
        let c = classifier(embedder);
        let rows = vec![
            EvalRow::new("good a", "A"),
            EvalRow::new("good b", "B"),
            EvalRow::new("noise", UNKNOWN_LABEL),
            EvalRow::new("wrong", "A"),
            EvalRow::new("!!!", UNKNOWN_LABEL),
        ];
        let report = Evaluator::new(&c).evaluate(&rows).unwrap();

        assert!((report.best_threshold() - 0.41).abs() < 1e-6);
        assert_eq!(report.unknown_predictions, 3);
        // Correctly rejected rows are not misclassifications
        assert_eq!(report.misclassifications.len(), 1);
        assert_eq!(report.misclassifications[0].text, "wrong");
        assert!(!report.class_stats.contains_key(UNKNOWN_LABEL));
        assert_eq!(report.confusion.labels.last().map(String::as_str), Some(UNKNOWN_LABEL));
        assert!((report.unknown_rate() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_worst_classes() {
        let (c, rows) = plateau_fixture();
        let report = Evaluator::new(&c).evaluate(&rows).unwrap();
        let worst = report.worst_classes(2);
        assert_eq!(worst.len(), 2);
        assert!(worst[0].1.f1 <= worst[1].1.f1);
        // B has the highest F1
        assert!(worst.iter().all(|(label, _)| *label != "B"));
    }

    #[test]
    fn test_score_stats() {
        let stats = ScoreStats::from_scores(&[0.2, 0.4, 0.6, 0.8]);
        assert!((stats.mean - 0.5).abs() < 1e-6);
        assert!((stats.median - 0.6).abs() < 1e-6);
        assert!((stats.min - 0.2).abs() < 1e-6);
        assert!((stats.max - 0.8).abs() < 1e-6);
        // sample std of 0.2, 0.4, 0.6, 0.8
        assert!((stats.std - 0.258199).abs() < 1e-5);

        let single = ScoreStats::from_scores(&[0.7]);
        assert_eq!(single.std, 0.0);
    }
}
