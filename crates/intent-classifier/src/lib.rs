//! # intent-classifier
//!
//! Nearest-neighbour intent classification with an `unknown` rejection
//! threshold, and the grid search that calibrates that threshold.
//!
//! ## Core Concepts
//!
//! - **Classifier**: normalize, encode, find the nearest example, then accept
//!   or reject by threshold
//! - **Decision rule**: the accept/reject step on its own, so predictions can be
//!   re-thresholded without re-encoding
//! - **Threshold optimizer**: ascending sweep over `0.00..=1.00` maximizing
//!   micro-averaged F1, keeping the lowest threshold on ties
//!
//! ## Usage
//!
//! ```rust,ignore
//! use intent_classifier::{Classifier, ThresholdOptimizer};
//!
//! let classifier = Classifier::new(store, embedder, normalizer);
//! let prediction = classifier.classify("book a flight to Hanoi")?;
//!
//! let best = ThresholdOptimizer::new().search(&truth, &predicted, &scores);
//! ```

pub mod classifier;
pub mod decision;
pub mod error;
pub mod threshold;

pub use classifier::Classifier;
pub use decision::DecisionRule;
pub use error::ClassifierError;
pub use threshold::{SweepPoint, ThresholdOptimizer, ThresholdSearchResult, GRID_STEPS};
