//! # intent-embeddings
//!
//! The two collaborators the classifier depends on: a text normalizer and an
//! embedding model.
//!
//! ## Features
//! - [`TextNormalizer`] trait with a Vietnamese + Latin default rule
//! - [`EmbeddingModel`] trait returning unit-normalized vectors
//! - Local inference via Candle with all-MiniLM-L6-v2 (384 dimensions)
//! - Automatic model file caching from HuggingFace Hub
//! - Deterministic [`MockEmbedder`] for tests and offline fixtures

pub mod cache;
pub mod candle;
pub mod error;
pub mod mock;
pub mod model;
pub mod normalize;

pub use crate::candle::CandleEmbedder;
pub use cache::{get_or_download_model, ModelCache, ModelPaths, MODEL_FILES};
pub use error::EmbeddingError;
pub use mock::MockEmbedder;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
pub use normalize::{DefaultNormalizer, TextNormalizer};
