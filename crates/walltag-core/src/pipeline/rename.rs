//! In-place renaming of tagged files.
//!
//! The new name is the old stem plus one `_tag` suffix per assigned tag,
//! with the extension kept as-is. Files never move across directories.

use std::path::{Path, PathBuf};

use crate::error::TagError;
use crate::types::Tag;

/// Compute the tagged filename for `file_name`.
///
/// `"beach.jpg"` with tags `[nature]` becomes `"beach_nature.jpg"`. A name
/// without an extension just gets the suffix appended. No already-tagged
/// detection: tagging `"beach_nature.jpg"` again yields
/// `"beach_nature_nature.jpg"`.
pub fn tagged_file_name(file_name: &str, tags: &[Tag]) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let suffix: String = tags.iter().map(|t| format!("_{}", t.name)).collect();

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}{suffix}.{ext}"),
        None => format!("{stem}{suffix}"),
    }
}

/// Rename `path` in place so its name carries `tags`. Returns the new path.
///
/// Fails without touching anything when the target name already exists.
pub fn append_tags(path: &Path, tags: &[Tag]) -> Result<PathBuf, TagError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TagError::Rename {
            from: path.to_path_buf(),
            to: path.to_path_buf(),
            message: "path has no valid file name".to_string(),
        })?;

    let new_name = tagged_file_name(file_name, tags);
    let target = path.with_file_name(&new_name);

    if target.exists() {
        return Err(TagError::RenameCollision { target });
    }

    std::fs::rename(path, &target).map_err(|e| TagError::Rename {
        from: path.to_path_buf(),
        to: target.clone(),
        message: e.to_string(),
    })?;

    Ok(target)
}
