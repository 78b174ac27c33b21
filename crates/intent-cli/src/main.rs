//! Intent classifier CLI
//!
//! # Usage
//!
//! ```bash
//! intent build-index [--data CSV] [--artifacts DIR]
//! intent predict [--artifacts DIR] [--threshold T] [TEXT]
//! intent evaluate [--data CSV] [--artifacts DIR] [--output FILE]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/intent-nn/config.toml)
//! 3. Environment variables (INTENT_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use intent_cli::{build_index, evaluate, init_logging, load_settings, predict, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings)?;

    match cli.command {
        Commands::BuildIndex { data, artifacts } => {
            build_index(&settings, data.as_deref(), artifacts.as_deref())?;
        }
        Commands::Predict {
            artifacts,
            threshold,
            text,
        } => {
            predict(&settings, artifacts.as_deref(), threshold, text.as_deref())?;
        }
        Commands::Evaluate {
            data,
            artifacts,
            output,
        } => {
            evaluate(
                &settings,
                data.as_deref(),
                artifacts.as_deref(),
                output.as_deref(),
            )?;
        }
    }

    Ok(())
}
