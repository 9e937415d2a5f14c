//! File discovery for finding images in the target folder.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::WalltagError;

/// Discovers image files in a folder.
///
/// Only direct entries are considered; subdirectories are never descended
/// into. Matching is by extension, so unsupported files are never opened.
pub struct ImageDiscovery {
    /// Supported extensions, pre-lowercased.
    formats: Vec<String>,
}

impl ImageDiscovery {
    /// Create a discovery instance from processing config.
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            formats: config
                .supported_formats
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    /// List all supported image files directly inside `folder`, sorted by
    /// path for deterministic ordering.
    ///
    /// A missing folder (or a path that is not a directory) is a fatal error.
    pub fn scan(&self, folder: &Path) -> Result<Vec<PathBuf>, WalltagError> {
        if !folder.is_dir() {
            return Err(WalltagError::FolderNotFound(folder.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && self.is_supported(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        tracing::debug!("Discovered {} image files in {:?}", files.len(), folder);
        Ok(files)
    }

    /// Check if a file has a supported extension (case-insensitive).
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.formats.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> ImageDiscovery {
        ImageDiscovery::new(&ProcessingConfig::default())
    }

    #[test]
    fn test_is_supported() {
        let discovery = discovery();
        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.jpeg")));
        assert!(discovery.is_supported(Path::new("test.png")));
        assert!(discovery.is_supported(Path::new("test.webp")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("test.gif")));
        assert!(!discovery.is_supported(Path::new("no_extension")));
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpg", "notes.txt", "c.WEBP"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = discovery().scan(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.WEBP"]);
    }

    #[test]
    fn test_scan_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("top.jpg"), b"x").unwrap();
        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("deep.jpg"), b"x").unwrap();

        let files = discovery().scan(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.jpg"));
    }

    #[test]
    fn test_scan_missing_folder_is_fatal() {
        let err = discovery().scan(Path::new("/no/such/folder")).unwrap_err();
        assert!(matches!(err, WalltagError::FolderNotFound(_)));
    }

    #[test]
    fn test_scan_rejects_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.jpg");
        std::fs::write(&file, b"x").unwrap();
        assert!(discovery().scan(&file).is_err());
    }

    #[test]
    fn test_scan_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discovery().scan(dir.path()).unwrap().is_empty());
    }
}
