//! CLI argument parsing for the `intent` binary.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Nearest-neighbour intent classifier
///
/// Builds the example index, classifies utterances, and calibrates the
/// rejection threshold against a labelled dataset.
#[derive(Parser, Debug)]
#[command(name = "intent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/intent-nn/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode the training CSV and write index artifacts
    BuildIndex {
        /// Training CSV with `utterance` and `intent` columns
        #[arg(short, long)]
        data: Option<String>,

        /// Output directory for the artifacts
        #[arg(short, long)]
        artifacts: Option<String>,
    },

    /// Classify one utterance, or read them from stdin until EOF
    Predict {
        /// Artifacts directory
        #[arg(short, long)]
        artifacts: Option<String>,

        /// Rejection threshold in [0, 1]
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Utterance to classify (interactive when omitted)
        text: Option<String>,
    },

    /// Evaluate against a labelled dataset and write the report
    Evaluate {
        /// Evaluation CSV with `text` and `intent_true` columns
        #[arg(short, long)]
        data: Option<String>,

        /// Artifacts directory
        #[arg(short, long)]
        artifacts: Option<String>,

        /// Report output path
        #[arg(short, long)]
        output: Option<String>,
    },
}
