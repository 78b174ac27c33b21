//! # intent-types
//!
//! Shared domain types for the intent detection system.
//!
//! This crate defines the data structures used across the workspace:
//! - Examples: labelled, unit-normalized vectors in the index
//! - Predictions: a label (or the `unknown` sentinel) with a confidence score
//! - Settings: layered configuration for the CLI
//!
//! ## Usage
//!
//! ```rust
//! use intent_types::{Prediction, UNKNOWN_LABEL};
//!
//! let p = Prediction::unknown();
//! assert_eq!(p.label, UNKNOWN_LABEL);
//! ```

pub mod config;
pub mod error;
pub mod prediction;

pub use config::Settings;
pub use error::IntentError;
pub use prediction::{is_unknown, Example, Prediction, UNKNOWN_LABEL};
