//! Error types for the walltag pipeline.
//!
//! Two tiers: [`WalltagError`] covers fatal startup/run errors (bad config,
//! missing model, manifest I/O), while [`TagError`] covers everything that can
//! go wrong for a single file and must not abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for walltag operations.
#[derive(Error, Debug)]
pub enum WalltagError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-file tagging errors promoted to the top level
    #[error("Tagging error: {0}")]
    Tag(#[from] TagError),

    /// Input folder missing or not a directory
    #[error("Folder not found or not a directory: {0}")]
    FolderNotFound(PathBuf),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest (CSV) writing errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] csv::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while processing a single image file, plus the model-level
/// failures that surface before any file is touched.
#[derive(Error, Debug)]
pub enum TagError {
    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Embedding inference failed
    #[error("Embedding failed for {path}: {message}")]
    Embedding { path: PathBuf, message: String },

    /// Model, tokenizer, or label encoding failure (not tied to one image)
    #[error("Model error: {message}")]
    Model { message: String },

    /// Renaming the file failed
    #[error("Rename failed for {from} -> {to}: {message}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    /// The computed tagged name already exists on disk
    #[error("Rename collision: {target} already exists")]
    RenameCollision { target: PathBuf },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

/// Convenience type alias for walltag results.
pub type Result<T> = std::result::Result<T, WalltagError>;

/// Convenience type alias for per-file results.
pub type TagResult<T> = std::result::Result<T, TagError>;
