//! Core data types for the walltag pipeline.
//!
//! These types describe the outcome of one tagging run: which files were
//! tagged with what, which files failed, and the report that the manifest
//! writer consumes.

use serde::{Deserialize, Serialize};

/// A category assigned to an image, with its softmax probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// The category label (e.g., "nature", "city")
    pub name: String,

    /// Softmax probability from 0.0 to 1.0
    pub score: f32,
}

impl Tag {
    /// Create a new tag with the given name and score.
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// A successfully processed file: its original name, the name it was
/// renamed to, and the tags that were assigned, best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedFile {
    /// Filename before renaming; the manifest is keyed by this
    pub file_name: String,

    /// Filename after the tags were appended
    pub new_name: String,

    /// Assigned tags in descending score order
    pub tags: Vec<Tag>,
}

impl TaggedFile {
    /// Tag names joined with `", "`, the manifest cell format.
    pub fn joined_tags(&self) -> String {
        self.tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A file that was discovered but could not be processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    /// Filename of the failed file
    pub file_name: String,

    /// Human-readable reason, from the underlying error
    pub reason: String,
}

/// Accumulated results of one run over a folder.
///
/// Built incrementally by the run loop; failed files never contribute a
/// partial record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Files that were classified and renamed
    pub tagged: Vec<TaggedFile>,

    /// Files that were skipped with an error
    pub failures: Vec<FileFailure>,
}

impl RunReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully tagged file.
    pub fn record_tagged(&mut self, file: TaggedFile) {
        self.tagged.push(file);
    }

    /// Record a skipped file with its failure reason.
    pub fn record_failure(&mut self, file_name: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(FileFailure {
            file_name: file_name.into(),
            reason: reason.into(),
        });
    }

    /// Number of files successfully tagged.
    pub fn tagged_count(&self) -> usize {
        self.tagged.len()
    }

    /// Number of files that failed.
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Total files the run attempted.
    pub fn total(&self) -> usize {
        self.tagged.len() + self.failures.len()
    }
}
