//! Plain-text evaluation report.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::EvalError;
use crate::evaluator::EvaluationReport;
use crate::metrics::{ClassificationReport, ConfusionMatrix, LabelMetrics};

/// Listed entries in the error and high-confidence sections
const LIST_LIMIT: usize = 10;

/// Characters of utterance text shown per listed example
const TEXT_PREVIEW: usize = 60;

const RULE_WIDE: usize = 80;
const RULE_NARROW: usize = 40;

/// Run metadata printed in the report header.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub generated_at: DateTime<Local>,
    pub dataset_path: PathBuf,
    pub artifacts_path: PathBuf,
}

impl ReportContext {
    pub fn new(dataset_path: impl Into<PathBuf>, artifacts_path: impl Into<PathBuf>) -> Self {
        Self {
            generated_at: Local::now(),
            dataset_path: dataset_path.into(),
            artifacts_path: artifacts_path.into(),
        }
    }
}

/// Render the full report.
pub fn render_report(report: &EvaluationReport, ctx: &ReportContext) -> String {
    Rendered { report, ctx }.to_string()
}

/// Write rendered report text, creating parent directories as needed.
pub fn write_report(path: impl AsRef<Path>, text: &str) -> Result<(), EvalError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    info!(path = ?path, bytes = text.len(), "Wrote evaluation report");
    Ok(())
}

struct Rendered<'a> {
    report: &'a EvaluationReport,
    ctx: &'a ReportContext,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        let wide = "=".repeat(RULE_WIDE);

        writeln!(f, "{}", wide)?;
        writeln!(f, "INTENT DETECTION EVALUATION REPORT")?;
        writeln!(f, "{}", wide)?;
        writeln!(
            f,
            "Generated on: {}",
            self.ctx.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(f, "Evaluation dataset: {}", self.ctx.dataset_path.display())?;
        writeln!(f, "Model artifacts: {}", self.ctx.artifacts_path.display())?;
        writeln!(f, "{}\n", wide)?;

        section(f, "1. DATASET OVERVIEW")?;
        writeln!(f, "Total samples: {}", r.total_samples)?;
        writeln!(f, "Unique intents: {}", r.unique_intents())?;
        writeln!(f, "Intent distribution:")?;
        for (intent, count) in &r.intent_distribution {
            writeln!(
                f,
                "  - {}: {} ({:.1}%)",
                intent,
                count,
                percent(*count, r.total_samples)
            )?;
        }
        writeln!(f)?;

        section(f, "2. THRESHOLD ANALYSIS")?;
        writeln!(f, "Best threshold: {:.3}", r.best_threshold())?;
        writeln!(f, "Current default threshold: {:.2}", r.default_threshold)?;
        writeln!(
            f,
            "Threshold improvement: {:.3}\n",
            r.best_threshold() - r.default_threshold
        )?;

        section(f, "3. OVERALL PERFORMANCE")?;
        writeln!(f, "Unknown predictions: {}", r.unknown_predictions)?;
        writeln!(f, "Unknown rate: {:.1}%", r.unknown_rate() * 100.0)?;
        writeln!(f, "Confidence score statistics:")?;
        let s = &r.score_stats;
        writeln!(f, "  - Mean: {:.3}", s.mean)?;
        writeln!(f, "  - Median: {:.3}", s.median)?;
        writeln!(f, "  - Min: {:.3}", s.min)?;
        writeln!(f, "  - Max: {:.3}", s.max)?;
        writeln!(f, "  - Std: {:.3}\n", s.std)?;

        section(f, "4. CLASSIFICATION REPORT")?;
        write_classification_table(f, &r.classification_report)?;
        writeln!(f)?;

        section(f, "5. PER-CLASS PERFORMANCE ANALYSIS")?;
        writeln!(
            f,
            "{:<20} {:<8} {:<10} {:<10} {:<10} {:<4} {:<4} {:<4}",
            "Intent", "Count", "Precision", "Recall", "F1-Score", "TP", "FP", "FN"
        )?;
        writeln!(f, "{}", "-".repeat(RULE_WIDE))?;
        for (label, c) in &r.class_stats {
            writeln!(
                f,
                "{:<20} {:<8} {:<10.3} {:<10.3} {:<10.3} {:<4} {:<4} {:<4}",
                label,
                c.count,
                c.precision,
                c.recall,
                c.f1,
                c.true_positive,
                c.false_positive,
                c.false_negative
            )?;
        }
        writeln!(f)?;

        section(f, "6. CONFUSION MATRIX")?;
        writeln!(f, "Predicted vs Actual:")?;
        writeln!(f, "Labels: {}", r.confusion.labels.join(", "))?;
        f.write_str(&matrix_text(&r.confusion))?;
        writeln!(f, "\n")?;

        section(f, "7. ERROR ANALYSIS")?;
        writeln!(f, "Top misclassified examples:")?;
        for (i, m) in r.misclassifications.iter().take(LIST_LIMIT).enumerate() {
            writeln!(f, "{}. Text: '{}...'", i + 1, preview(&m.text))?;
            writeln!(
                f,
                "   True: {} | Predicted: {} | Score: {:.3}\n",
                m.true_label, m.predicted_label, m.score
            )?;
        }

        section(f, "8. HIGH CONFIDENCE EXAMPLES")?;
        for (i, h) in r.high_confidence.iter().take(LIST_LIMIT).enumerate() {
            writeln!(f, "{}. Text: '{}...'", i + 1, preview(&h.text))?;
            writeln!(
                f,
                "   Predicted: {} | Score: {:.3}\n",
                h.predicted_label, h.score
            )?;
        }

        section(f, "9. RECOMMENDATIONS")?;
        writeln!(
            f,
            "1. Use threshold {:.3} for optimal F1-score",
            r.best_threshold()
        )?;
        writeln!(
            f,
            "2. Consider adding more training data for intents with low recall"
        )?;
        writeln!(
            f,
            "3. Review high-confidence errors for potential data quality issues"
        )?;
        writeln!(f, "4. Monitor unknown rate: {:.1}%", r.unknown_rate() * 100.0)?;

        writeln!(f, "\n{}", wide)?;
        writeln!(f, "END OF REPORT")?;
        writeln!(f, "{}", wide)
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(RULE_NARROW))
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn preview(text: &str) -> String {
    text.chars().take(TEXT_PREVIEW).collect()
}

/// Precision/recall/f1/support table with right-aligned 9-wide columns.
pub fn write_classification_table<W: fmt::Write>(
    out: &mut W,
    report: &ClassificationReport,
) -> fmt::Result {
    const DIGITS: usize = 3;
    let width = report
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .chain([report.weighted_avg.label.len(), DIGITS])
        .max()
        .unwrap_or(DIGITS);

    write!(out, "{:>width$} ", "", width = width)?;
    for header in ["precision", "recall", "f1-score", "support"] {
        write!(out, " {:>9}", header)?;
    }
    out.write_str("\n\n")?;

    for m in &report.rows {
        write_metrics_row(out, m, width)?;
    }
    out.write_char('\n')?;
    writeln!(
        out,
        "{:>width$}  {:>9} {:>9} {:>9.3} {:>9}",
        "accuracy",
        "",
        "",
        report.accuracy,
        report.total,
        width = width
    )?;
    write_metrics_row(out, &report.macro_avg, width)?;
    write_metrics_row(out, &report.weighted_avg, width)
}

fn write_metrics_row<W: fmt::Write>(out: &mut W, m: &LabelMetrics, width: usize) -> fmt::Result {
    writeln!(
        out,
        "{:>width$}  {:>9.3} {:>9.3} {:>9.3} {:>9}",
        m.label,
        m.precision,
        m.recall,
        m.f1,
        m.support,
        width = width
    )
}

/// Bracketed integer matrix with a shared column width.
fn matrix_text(matrix: &ConfusionMatrix) -> String {
    let width = matrix
        .counts
        .iter()
        .flatten()
        .map(|c| c.to_string().len())
        .max()
        .unwrap_or(1);

    let rows: Vec<String> = matrix
        .counts
        .iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .map(|c| format!("{:>width$}", c, width = width))
                .collect();
            format!("[{}]", cells.join(" "))
        })
        .collect();

    format!("[{}]", rows.join("\n "))
}
