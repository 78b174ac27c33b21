//! Command implementations for the `intent` binary.
//!
//! Handles:
//! - build-index: encode the training CSV and write artifacts
//! - predict: classify a single utterance or an interactive stdin session
//! - evaluate: calibrate the threshold on a labelled dataset and write the report

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use intent_classifier::Classifier;
use intent_embeddings::{
    CandleEmbedder, DefaultNormalizer, EmbeddingModel, ModelCache, TextNormalizer,
};
use intent_eval::{load_dataset, render_report, write_report, EvaluationReport, Evaluator, ReportContext};
use intent_types::Settings;
use intent_vector::{load_training_rows, IndexBuilder};

/// Prompt shown by the interactive predict loop
pub const PROMPT: &str = "Enter your utterance: ";

/// Intents listed in the console summary
const WORST_LISTED: usize = 3;

/// Load configuration and apply the global `--log-level` override.
///
/// Layers: defaults -> config file -> `INTENT_*` env -> CLI flags.
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the setting.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn load_encoder(settings: &Settings) -> Result<Arc<dyn EmbeddingModel>> {
    let cache = ModelCache::for_repo(&settings.model_repo, settings.expanded_model_cache_dir());
    info!(repo = %settings.model_repo, dir = ?cache.model_dir(), "Loading sentence encoder");
    let embedder = CandleEmbedder::load(&cache).context("Failed to load sentence encoder")?;
    Ok(Arc::new(embedder))
}

fn artifacts_dir(settings: &Settings, override_dir: Option<&str>) -> PathBuf {
    match override_dir {
        Some(dir) => PathBuf::from(dir),
        None => settings.expanded_artifacts_dir(),
    }
}

fn load_classifier(
    settings: &Settings,
    artifacts: &Path,
    embedder: Arc<dyn EmbeddingModel>,
) -> Result<Classifier> {
    let settings = Settings {
        artifacts_dir: artifacts.to_string_lossy().into_owned(),
        ..settings.clone()
    };
    let normalizer: Arc<dyn TextNormalizer> = Arc::new(DefaultNormalizer::new());
    let classifier = Classifier::from_settings(&settings, embedder, normalizer)
        .with_context(|| format!("Failed to load index artifacts from {}", artifacts.display()))?;
    Ok(classifier)
}

/// Encode the training CSV and write index artifacts.
pub fn build_index(settings: &Settings, data: Option<&str>, artifacts: Option<&str>) -> Result<()> {
    let data = data.unwrap_or(&settings.training_data);
    let out_dir = artifacts_dir(settings, artifacts);

    let rows = load_training_rows(data)
        .with_context(|| format!("Failed to read training data from {}", data))?;
    let builder = IndexBuilder::new(load_encoder(settings)?, Arc::new(DefaultNormalizer::new()));
    let stats = builder
        .build_to_dir(&rows, &out_dir)
        .context("Failed to build index")?;

    println!("Saved {} samples to {}", stats.indexed, out_dir.display());
    Ok(())
}

/// Classify `text`, or run the interactive loop on stdin when it is `None`.
pub fn predict(
    settings: &Settings,
    artifacts: Option<&str>,
    threshold: Option<f32>,
    text: Option<&str>,
) -> Result<()> {
    let dir = artifacts_dir(settings, artifacts);
    let mut classifier = load_classifier(settings, &dir, load_encoder(settings)?)?;
    if let Some(t) = threshold {
        classifier.set_threshold(t).context("Invalid threshold")?;
    }

    let stdout = io::stdout();
    match text {
        Some(text) => {
            let mut out = stdout.lock();
            print_prediction(&classifier, text, &mut out)
        }
        None => run_interactive(&classifier, io::stdin().lock(), stdout.lock()),
    }
}

fn print_prediction<W: Write>(classifier: &Classifier, text: &str, out: &mut W) -> Result<()> {
    let prediction = classifier.classify(text).context("Classification failed")?;
    writeln!(
        out,
        "Predicted intent: {} (score: {:.3})",
        prediction.label, prediction.score
    )?;
    Ok(())
}

/// Prompt, classify and print until the input ends.
pub fn run_interactive<R: BufRead, W: Write>(
    classifier: &Classifier,
    mut input: R,
    mut out: W,
) -> Result<()> {
    let mut line = String::new();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(());
        }
        print_prediction(classifier, line.trim_end_matches(['\r', '\n']), &mut out)?;
    }
}

/// Evaluate on a labelled dataset, write the report and print a summary.
pub fn evaluate(
    settings: &Settings,
    data: Option<&str>,
    artifacts: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let data = data.unwrap_or(&settings.eval_data);
    let output = output.unwrap_or(&settings.report_path);
    let dir = artifacts_dir(settings, artifacts);

    let rows = load_dataset(data).context("Failed to load evaluation dataset")?;
    let classifier = load_classifier(settings, &dir, load_encoder(settings)?)?;
    let report = Evaluator::new(&classifier)
        .with_high_confidence(settings.high_confidence)
        .evaluate(&rows)
        .context("Evaluation failed")?;

    let text = render_report(&report, &ReportContext::new(data, &dir));
    write_report(output, &text).context("Failed to write report")?;

    print!("{}", console_summary(&report, output));
    Ok(())
}

/// Short summary printed after an evaluation run.
pub fn console_summary(report: &EvaluationReport, report_path: &str) -> String {
    let mut lines = vec![
        "=== EVALUATION COMPLETE ===".to_string(),
        format!("Best threshold: {:.3}", report.best_threshold()),
        format!("Report saved to: {}", report_path),
        format!("Total samples: {}", report.total_samples),
        format!("Unknown rate: {:.1}%", report.unknown_rate() * 100.0),
        String::new(),
        format!("Top {} worst performing intents:", WORST_LISTED),
    ];
    for (intent, stats) in report.worst_classes(WORST_LISTED) {
        lines.push(format!(
            "  - {}: F1={:.3}, Recall={:.3}",
            intent, stats.f1, stats.recall
        ));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
