//! Classification metrics over final (post-threshold) predictions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use intent_classifier::threshold::{harmonic_mean, ratio};
use intent_types::is_unknown;

/// Per-intent confusion statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    /// Occurrences of the intent among true labels
    pub count: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
}

/// Sorted union of labels seen in either slice.
pub fn label_union<T: AsRef<str>, P: AsRef<str>>(truth: &[T], predicted: &[P]) -> Vec<String> {
    truth
        .iter()
        .map(AsRef::as_ref)
        .chain(predicted.iter().map(AsRef::as_ref))
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Statistics for every label in truth or predictions, except `unknown`.
pub fn per_class_stats<T: AsRef<str>, P: AsRef<str>>(
    truth: &[T],
    predicted: &[P],
) -> BTreeMap<String, ClassStats> {
    label_union(truth, predicted)
        .into_iter()
        .filter(|label| !is_unknown(label))
        .map(|label| {
            let (mut tp, mut fp, mut fn_, mut count) = (0, 0, 0, 0);
            for (t, p) in truth.iter().zip(predicted) {
                let is_true = t.as_ref() == label;
                let is_pred = p.as_ref() == label;
                count += usize::from(is_true);
                match (is_true, is_pred) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }
            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            let stats = ClassStats {
                count,
                precision,
                recall,
                f1: harmonic_mean(precision, recall),
                true_positive: tp,
                false_positive: fp,
                false_negative: fn_,
            };
            (label, stats)
        })
        .collect()
}

/// Confusion matrix: rows are true labels, columns predicted labels, both in
/// `labels` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Build over the sorted union of observed labels.
    pub fn from_predictions<T: AsRef<str>, P: AsRef<str>>(truth: &[T], predicted: &[P]) -> Self {
        let labels = label_union(truth, predicted);
        let position: BTreeMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();

        let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
        for (t, p) in truth.iter().zip(predicted) {
            if let (Some(&row), Some(&col)) = (position.get(t.as_ref()), position.get(p.as_ref())) {
                counts[row][col] += 1;
            }
        }

        Self { labels, counts }
    }

    pub fn get(&self, true_label: &str, predicted_label: &str) -> usize {
        let row = self.labels.iter().position(|l| l == true_label);
        let col = self.labels.iter().position(|l| l == predicted_label);
        match (row, col) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    /// Number of examples whose true label is `labels[i]`.
    pub fn row_sums(&self) -> Vec<usize> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    /// Number of examples predicted as `labels[j]`.
    pub fn column_sums(&self) -> Vec<usize> {
        (0..self.labels.len())
            .map(|j| self.counts.iter().map(|row| row[j]).sum())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// Precision/recall/F1/support for one label of the classification report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Multi-class summary in the usual precision/recall/f1/support layout.
///
/// Unlike [`per_class_stats`], `unknown` is included as a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub rows: Vec<LabelMetrics>,
    pub accuracy: f64,
    pub macro_avg: LabelMetrics,
    pub weighted_avg: LabelMetrics,
    pub total: usize,
}

impl ClassificationReport {
    pub fn from_predictions<T: AsRef<str>, P: AsRef<str>>(truth: &[T], predicted: &[P]) -> Self {
        let matrix = ConfusionMatrix::from_predictions(truth, predicted);
        let supports = matrix.row_sums();
        let predicted_counts = matrix.column_sums();
        let total = matrix.total();

        let rows: Vec<LabelMetrics> = matrix
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let tp = matrix.counts[i][i];
                let precision = ratio(tp, predicted_counts[i]);
                let recall = ratio(tp, supports[i]);
                LabelMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1: harmonic_mean(precision, recall),
                    support: supports[i],
                }
            })
            .collect();

        let correct: usize = (0..matrix.labels.len()).map(|i| matrix.counts[i][i]).sum();
        let n = rows.len().max(1) as f64;
        let macro_avg = LabelMetrics {
            label: "macro avg".to_string(),
            precision: rows.iter().map(|r| r.precision).sum::<f64>() / n,
            recall: rows.iter().map(|r| r.recall).sum::<f64>() / n,
            f1: rows.iter().map(|r| r.f1).sum::<f64>() / n,
            support: total,
        };
        let weighted = |f: fn(&LabelMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                rows.iter().map(|r| f(r) * r.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = LabelMetrics {
            label: "weighted avg".to_string(),
            precision: weighted(|r| r.precision),
            recall: weighted(|r| r.recall),
            f1: weighted(|r| r.f1),
            support: total,
        };

        Self {
            accuracy: ratio(correct, total),
            rows,
            macro_avg,
            weighted_avg,
            total,
        }
    }
}
