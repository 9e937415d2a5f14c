//! Zero-shot category scoring.
//!
//! Scores images against a small closed category set by computing dot
//! products between image embeddings and the encoded labels, with a softmax
//! over the result.

pub mod categories;
pub mod scorer;

pub use categories::{CategorySet, DEFAULT_CATEGORIES};
pub use scorer::CategoryScorer;
