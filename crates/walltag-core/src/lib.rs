//! Walltag Core - Embeddable zero-shot image tagging library.
//!
//! Walltag scores images against a fixed set of category labels using a
//! CLIP model, then renames each file so its tags become part of the
//! filename (`beach.jpg` -> `beach_nature.jpg`).
//!
//! # Architecture
//!
//! Walltag is a pure pipeline with no database dependencies:
//!
//! ```text
//! Folder → Discover → Decode → Embed (CLIP) → Score → Rename → CSV manifest
//! ```
//!
//! Category labels are encoded once per run; every image afterwards costs a
//! single vision forward pass plus a handful of dot products.
//!
//! # Usage
//!
//! ```rust,ignore
//! use walltag_core::{CategoryScorer, CategorySet, ClipEngine, Config, FolderTagger};
//!
//! fn main() -> walltag_core::Result<()> {
//!     let config = Config::load()?;
//!     let categories = CategorySet::new(config.labels.categories.clone())?;
//!
//!     let engine = ClipEngine::load(&config.model, &config.model_dir())?;
//!     let embeddings = engine.encode_labels(categories.names())?;
//!     let scorer = CategoryScorer::from_embeddings(categories, embeddings)?;
//!
//!     let tagger = FolderTagger::new(engine, scorer, config.tagging.top_k);
//!     let tagged = tagger.process_file("./beach.jpg".as_ref())?;
//!     println!("{} -> {}", tagged.file_name, tagged.new_name);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod device;
pub mod embedding;
pub mod error;
pub mod manifest;
pub mod math;
pub mod pipeline;
pub mod tagging;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use device::Device;
pub use embedding::{ClipEngine, ImageEmbedder};
pub use error::{ConfigError, Result, TagError, TagResult, WalltagError};
pub use manifest::{write_manifest, ManifestWriter};
pub use pipeline::{FolderTagger, ImageDiscovery};
pub use tagging::{CategoryScorer, CategorySet, DEFAULT_CATEGORIES};
pub use types::{FileFailure, RunReport, Tag, TaggedFile};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
