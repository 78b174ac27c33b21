//! Configuration loading for intent-nn.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/intent-nn/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::IntentError;

/// Default decision threshold for the nearest-neighbour match.
pub const DEFAULT_THRESHOLD: f32 = 0.55;

/// Score at or above which an example counts as high-confidence in reports.
pub const DEFAULT_HIGH_CONFIDENCE: f32 = 0.8;

/// Default embedding model repository on HuggingFace.
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding `intent_embeddings.json` and `intent_labels.json`
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,

    /// Training CSV used by `build-index` (columns: utterance, intent)
    #[serde(default = "default_training_data")]
    pub training_data: String,

    /// Evaluation CSV (columns: text, intent_true)
    #[serde(default = "default_eval_data")]
    pub eval_data: String,

    /// Where the evaluation report is written
    #[serde(default = "default_report_path")]
    pub report_path: String,

    /// Minimum similarity to accept the nearest match
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Score cutoff for the high-confidence report section
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f32,

    /// Embedding model repository ID
    #[serde(default = "default_model_repo")]
    pub model_repo: String,

    /// Model file cache directory (None = platform cache dir)
    #[serde(default)]
    pub model_cache_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_artifacts_dir() -> String {
    "nlu/intent/artifacts".to_string()
}

fn default_training_data() -> String {
    "data/intent_prepared.csv".to_string()
}

fn default_eval_data() -> String {
    "data/intent_eval.csv".to_string()
}

fn default_report_path() -> String {
    "evaluation_report.txt".to_string()
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_high_confidence() -> f32 {
    DEFAULT_HIGH_CONFIDENCE
}

fn default_model_repo() -> String {
    DEFAULT_MODEL_REPO.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            training_data: default_training_data(),
            eval_data: default_eval_data(),
            report_path: default_report_path(),
            threshold: default_threshold(),
            high_confidence: default_high_confidence(),
            model_repo: default_model_repo(),
            model_cache_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/intent-nn/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (INTENT_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, IntentError> {
        let config_dir = ProjectDirs::from("", "", "intent-nn")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            // 1. Built-in defaults
            .set_default("artifacts_dir", default_artifacts_dir())
            .map_err(|e| IntentError::Config(e.to_string()))?
            .set_default("training_data", default_training_data())
            .map_err(|e| IntentError::Config(e.to_string()))?
            .set_default("eval_data", default_eval_data())
            .map_err(|e| IntentError::Config(e.to_string()))?
            .set_default("report_path", default_report_path())
            .map_err(|e| IntentError::Config(e.to_string()))?
            .set_default("threshold", default_threshold() as f64)
            .map_err(|e| IntentError::Config(e.to_string()))?
            .set_default("high_confidence", default_high_confidence() as f64)
            .map_err(|e| IntentError::Config(e.to_string()))?
            .set_default("model_repo", default_model_repo())
            .map_err(|e| IntentError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| IntentError::Config(e.to_string()))?
            // 2. Default config file
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        // 3. CLI-specified config file (higher precedence than default)
        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 4. Environment variables: INTENT_ARTIFACTS_DIR, INTENT_THRESHOLD, ...
        builder = builder.add_source(
            Environment::with_prefix("INTENT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| IntentError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| IntentError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), IntentError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(IntentError::Config(format!(
                "threshold must be 0.0-1.0, got {}",
                self.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.high_confidence) {
            return Err(IntentError::Config(format!(
                "high_confidence must be 0.0-1.0, got {}",
                self.high_confidence
            )));
        }
        Ok(())
    }

    /// Artifacts directory with a leading `~/` expanded.
    pub fn expanded_artifacts_dir(&self) -> PathBuf {
        expand_home(&self.artifacts_dir)
    }

    /// Model cache directory with a leading `~/` expanded, if configured.
    pub fn expanded_model_cache_dir(&self) -> Option<PathBuf> {
        self.model_cache_dir.as_deref().map(expand_home)
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
