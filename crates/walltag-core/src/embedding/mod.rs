//! CLIP embedding generation.
//!
//! This module turns images and label strings into vectors in a shared
//! embedding space, using a CLIP export running locally via ONNX Runtime.
//! Both encoder halves are loaded together so labels scored against image
//! embeddings always come from the same model variant.
//!
//! # Usage
//!
//! ```rust,ignore
//! use walltag_core::config::Config;
//! use walltag_core::embedding::{ClipEngine, ImageEmbedder};
//!
//! let config = Config::default();
//! let engine = ClipEngine::load(&config.model, &config.model_dir())?;
//! let label_vectors = engine.encode_labels(&["nature".to_string()])?;
//! let image_vector = engine.embed(&decoded_image, path)?;
//! ```

pub(crate) mod preprocess;
mod text;
mod vision;

use std::path::Path;

use image::DynamicImage;

use crate::config::ModelConfig;
use crate::error::{TagError, TagResult};

use self::preprocess::preprocess;
use self::text::TextSession;
use self::vision::VisionSession;

/// The vision encoder ONNX filename.
const VISUAL_MODEL_FILENAME: &str = "visual.onnx";

/// The text encoder ONNX filename.
const TEXT_MODEL_FILENAME: &str = "text_model.onnx";

/// The tokenizer definition filename.
const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Anything that can turn a decoded image into an embedding vector.
///
/// The pipeline is generic over this so tests can substitute a deterministic
/// embedder with no model files on disk.
pub trait ImageEmbedder {
    /// Produce an L2-normalized embedding for a decoded image.
    ///
    /// `path` is carried for error context only.
    fn embed(&self, image: &DynamicImage, path: &Path) -> TagResult<Vec<f32>>;
}

/// Engine holding both CLIP encoder halves plus the preprocessing size.
pub struct ClipEngine {
    vision: VisionSession,
    text: TextSession,
    image_size: u32,
}

impl ClipEngine {
    /// Load both encoders from `{model_dir}/{variant}/`.
    ///
    /// Expects `visual.onnx`, `text_model.onnx`, and `tokenizer.json` in the
    /// variant directory; fails with a download hint when any is missing.
    pub fn load(config: &ModelConfig, model_dir: &Path) -> Result<Self, TagError> {
        let variant_dir = model_dir.join(&config.variant);

        for file in [VISUAL_MODEL_FILENAME, TEXT_MODEL_FILENAME, TOKENIZER_FILENAME] {
            if !variant_dir.join(file).exists() {
                return Err(TagError::Model {
                    message: format!(
                        "{file} not found in {variant_dir:?}. Run `walltag models download` first."
                    ),
                });
            }
        }

        tracing::info!(
            "Loading CLIP model {} (device: {})",
            config.variant,
            config.device
        );
        let vision = VisionSession::load(&variant_dir.join(VISUAL_MODEL_FILENAME), config.device)?;
        let text = TextSession::load(
            &variant_dir.join(TEXT_MODEL_FILENAME),
            &variant_dir.join(TOKENIZER_FILENAME),
            config.device,
            config.context_length,
        )?;
        tracing::info!("CLIP model loaded");

        Ok(Self {
            vision,
            text,
            image_size: config.image_size,
        })
    }

    /// Image input size for the loaded variant.
    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    /// Encode category labels through the text encoder.
    ///
    /// Returns one L2-normalized vector per label, in input order.
    pub fn encode_labels(&self, labels: &[String]) -> TagResult<Vec<Vec<f32>>> {
        self.text.encode_batch(labels)
    }

    /// Check whether all model files for this variant exist on disk.
    pub fn model_exists(config: &ModelConfig, model_dir: &Path) -> bool {
        let variant_dir = model_dir.join(&config.variant);
        [VISUAL_MODEL_FILENAME, TEXT_MODEL_FILENAME, TOKENIZER_FILENAME]
            .iter()
            .all(|file| variant_dir.join(file).exists())
    }
}

impl ImageEmbedder for ClipEngine {
    fn embed(&self, image: &DynamicImage, path: &Path) -> TagResult<Vec<f32>> {
        let tensor = preprocess(image, self.image_size);
        self.vision.embed(&tensor, path)
    }
}

/// Pick which session output holds the embedding.
///
/// Scans `preference` in order rather than taking the first recognized name
/// in export order. transformers.js exports often list the pre-projection
/// `pooler_output` ahead of the projected `image_embeds`/`text_embeds`, and
/// reading the former on one side only would mix embedding spaces. Exports
/// with none of the preferred names fall back to their first output.
fn select_output<'a, V>(outputs: &'a [(&str, V)], preference: &[&str]) -> Option<&'a V> {
    preference
        .iter()
        .find_map(|wanted| outputs.iter().find(|(name, _)| name == wanted))
        .or_else(|| outputs.first())
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::select_output;

    const PREFERENCE: [&str; 2] = ["image_embeds", "pooler_output"];

    #[test]
    fn preferred_output_wins_over_export_order() {
        let outputs = [("pooler_output", 768usize), ("image_embeds", 512usize)];
        assert_eq!(select_output(&outputs, &PREFERENCE), Some(&512));
    }

    #[test]
    fn second_choice_used_when_first_is_absent() {
        let outputs = [("last_hidden_state", 77usize), ("pooler_output", 768usize)];
        assert_eq!(select_output(&outputs, &PREFERENCE), Some(&768));
    }

    #[test]
    fn unknown_names_fall_back_to_first_output() {
        let outputs = [("sentence_embedding", 384usize)];
        assert_eq!(select_output(&outputs, &PREFERENCE), Some(&384));
    }

    #[test]
    fn empty_outputs_select_nothing() {
        let outputs: [(&str, usize); 0] = [];
        assert_eq!(select_output(&outputs, &PREFERENCE), None);
    }
}
