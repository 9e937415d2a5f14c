//! Per-file orchestration: decode, embed, score, rename.

use std::path::Path;

use crate::embedding::ImageEmbedder;
use crate::error::TagResult;
use crate::tagging::CategoryScorer;
use crate::types::TaggedFile;

use super::decode::decode_image;
use super::rename::append_tags;

/// Runs the full pipeline for one file at a time.
///
/// Generic over the embedder so the pipeline can be exercised without ONNX
/// model files. Failures are returned, never logged here; the run loop owns
/// error reporting and decides to continue.
pub struct FolderTagger<E: ImageEmbedder> {
    embedder: E,
    scorer: CategoryScorer,
    top_k: usize,
}

impl<E: ImageEmbedder> FolderTagger<E> {
    /// Create a tagger from a loaded embedder and an encoded category scorer.
    pub fn new(embedder: E, scorer: CategoryScorer, top_k: usize) -> Self {
        Self {
            embedder,
            scorer,
            top_k,
        }
    }

    /// Decode, embed, score, and rename a single image file.
    ///
    /// Returns the record for the manifest, or the per-file error that made
    /// this file a skip. A failure before the rename leaves the file
    /// untouched; a rename failure after classification also produces no
    /// record.
    pub fn process_file(&self, path: &Path) -> TagResult<TaggedFile> {
        let start = std::time::Instant::now();
        tracing::debug!("Processing {:?}", path);

        let image = decode_image(path)?;
        let embedding = self.embedder.embed(&image, path)?;
        let tags = self.scorer.top_k(&embedding, self.top_k)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let new_path = append_tags(path, &tags)?;
        let new_name = new_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!(
            "Tagged {} -> {} in {:?}",
            file_name,
            new_name,
            start.elapsed()
        );

        Ok(TaggedFile {
            file_name,
            new_name,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessingConfig;
    use crate::error::TagError;
    use crate::manifest::ManifestWriter;
    use crate::pipeline::discovery::ImageDiscovery;
    use crate::tagging::CategorySet;
    use crate::types::RunReport;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::path::PathBuf;

    /// Deterministic embedder: always returns the same unit vector, so the
    /// top category is fixed by the scorer's label embeddings.
    struct FixedEmbedder(Vec<f32>);

    impl ImageEmbedder for FixedEmbedder {
        fn embed(&self, _image: &DynamicImage, _path: &Path) -> TagResult<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    /// Scorer over {nature, city} where `[1, 0]` lands on nature.
    fn nature_city_scorer() -> CategoryScorer {
        let categories = CategorySet::new(vec!["nature".into(), "city".into()]).unwrap();
        CategoryScorer::from_embeddings(categories, vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap()
    }

    fn nature_tagger(top_k: usize) -> FolderTagger<FixedEmbedder> {
        FolderTagger::new(FixedEmbedder(vec![1.0, 0.0]), nature_city_scorer(), top_k)
    }

    fn write_png(path: &PathBuf) {
        RgbImage::from_pixel(8, 8, Rgb([30, 160, 60]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_process_file_tags_and_renames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beach.png");
        write_png(&path);

        let record = nature_tagger(1).process_file(&path).unwrap();
        assert_eq!(record.file_name, "beach.png");
        assert_eq!(record.new_name, "beach_nature.png");
        assert_eq!(record.tags.len(), 1);
        assert_eq!(record.tags[0].name, "nature");

        assert!(!path.exists());
        assert!(dir.path().join("beach_nature.png").exists());
    }

    #[test]
    fn test_tag_count_clamped_to_categories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        write_png(&path);

        // top_k of 5 with only 2 categories assigns both, best first.
        let record = nature_tagger(5).process_file(&path).unwrap();
        assert_eq!(record.tags.len(), 2);
        assert_eq!(record.tags[0].name, "nature");
        assert_eq!(record.new_name, "wide_nature_city.png");
        assert!(record.tags[0].score >= record.tags[1].score);
    }

    #[test]
    fn test_corrupt_file_fails_without_rename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let err = nature_tagger(1).process_file(&path).unwrap_err();
        assert!(matches!(err, TagError::Decode { .. }));
        // Failed files keep their original name.
        assert!(path.exists());
    }

    #[test]
    fn test_rerun_appends_tags_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beach.png");
        write_png(&path);

        let tagger = nature_tagger(1);
        let first = tagger.process_file(&path).unwrap();
        assert_eq!(first.new_name, "beach_nature.png");

        // Second run over the output: no already-tagged detection, the tag
        // is appended a second time.
        let second = tagger
            .process_file(&dir.path().join("beach_nature.png"))
            .unwrap();
        assert_eq!(second.new_name, "beach_nature_nature.png");
        assert!(dir.path().join("beach_nature_nature.png").exists());
    }

    #[test]
    fn test_folder_scenario_beach_and_notes() {
        // Folder with one good image, one text file, one corrupt image:
        // the image is renamed, the text file is never touched, the corrupt
        // file is skipped, and the manifest holds exactly one row.
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("beach.png"));
        std::fs::write(dir.path().join("notes.txt"), b"remember the milk").unwrap();
        std::fs::write(dir.path().join("broken.jpg"), b"garbage").unwrap();

        let discovery = ImageDiscovery::new(&ProcessingConfig::default());
        let files = discovery.scan(dir.path()).unwrap();
        assert_eq!(files.len(), 2); // notes.txt is never even listed

        let tagger = nature_tagger(1);
        let mut report = RunReport::new();
        for file in &files {
            match tagger.process_file(file) {
                Ok(record) => report.record_tagged(record),
                Err(e) => {
                    let name = file
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown");
                    report.record_failure(name, e.to_string());
                }
            }
        }

        assert_eq!(report.tagged_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failures[0].file_name, "broken.jpg");

        assert!(dir.path().join("beach_nature.png").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("broken.jpg").exists());

        let mut buffer = Vec::new();
        let mut writer = ManifestWriter::new(&mut buffer);
        writer.write_report(&report).unwrap();
        writer.flush().unwrap();
        let manifest = String::from_utf8(buffer).unwrap();
        assert_eq!(manifest, "filename,tags\nbeach.png,nature\n");
    }
}
