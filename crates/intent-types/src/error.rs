//! Error types for the intent detection system.

use thiserror::Error;

/// Unified error type for shared intent operations.
#[derive(Debug, Error)]
pub enum IntentError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
