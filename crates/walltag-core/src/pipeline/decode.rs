//! Image decoding with content-based format detection.

use std::io::Cursor;
use std::path::Path;

use image::DynamicImage;

use crate::error::TagError;

/// Decode an image file.
///
/// The format is detected from the file contents, not the extension, so a
/// misnamed file still decodes. Any failure maps to a per-file error.
pub fn decode_image(path: &Path) -> Result<DynamicImage, TagError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TagError::FileNotFound(path.to_path_buf())
        } else {
            TagError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {e}"),
            }
        }
    })?;

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TagError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {e}"),
        })?;

    reader.decode().map_err(|e| TagError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
