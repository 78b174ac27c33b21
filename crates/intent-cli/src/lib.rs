//! Library side of the `intent` binary.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (build-index, predict, evaluate)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    build_index, console_summary, evaluate, init_logging, load_settings, predict, run_interactive,
};
