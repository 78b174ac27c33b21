//! # intent-vector
//!
//! Vector store for intent-nn.
//!
//! Holds one unit-normalized vector per known example with a parallel label
//! list and answers exact top-1 nearest-neighbour queries by cosine
//! similarity.
//!
//! ## Features
//! - Exhaustive scan with a deterministic lowest-index tie-break
//! - Read-only after construction, safe to share across threads
//! - JSON index artifacts (`intent_embeddings.json` + `intent_labels.json`)
//! - Offline index builder driven by an injected encoder and normalizer

pub mod artifacts;
pub mod builder;
pub mod error;
pub mod similarity;
pub mod store;

pub use artifacts::{load_artifacts, save_artifacts, EMBEDDINGS_FILE, LABELS_FILE};
pub use builder::{load_training_rows, BuildStats, IndexBuilder, TrainingRow};
pub use error::VectorError;
pub use similarity::cosine_similarity;
pub use store::{Neighbor, VectorStore};
