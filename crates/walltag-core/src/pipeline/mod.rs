//! The file-level tagging pipeline.
//!
//! Stages, in the order the run loop applies them:
//! - **discovery**: list supported image files in the folder
//! - **decode**: load and decode one image
//! - **processor**: decode → embed → score → rename for one file
//! - **rename**: append tags to the filename in place
//! - **hash**: content hashing for downloaded model files

pub mod decode;
pub mod discovery;
pub mod hash;
pub mod processor;
pub mod rename;

// Re-exports for convenient access
pub use decode::decode_image;
pub use discovery::ImageDiscovery;
pub use hash::content_hash;
pub use processor::FolderTagger;
pub use rename::{append_tags, tagged_file_name};
