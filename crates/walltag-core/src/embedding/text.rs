//! CLIP text encoder for embedding category labels.
//!
//! Loads the text half of a CLIP ONNX export plus its tokenizer, and encodes
//! label strings into vectors aligned with the vision encoder's space.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::device::Device;
use crate::error::TagError;

/// Output names tried in order; falls back to the model's first output.
const OUTPUT_PREFERENCE: [&str; 2] = ["text_embeds", "pooler_output"];

/// CLIP text encoder wrapper.
///
/// Uses the same `Mutex<Session>` pattern as the vision encoder.
pub struct TextSession {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
    /// Whether the export declares an `attention_mask` input.
    wants_attention_mask: bool,
    /// Token length cap (77 for CLIP).
    context_length: usize,
}

impl TextSession {
    /// Load the text encoder and tokenizer.
    pub fn load(
        model_path: &Path,
        tokenizer_path: &Path,
        device: Device,
        context_length: usize,
    ) -> Result<Self, TagError> {
        let session = Session::builder()
            .map_err(|e| TagError::Model {
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .with_execution_providers(device.execution_providers())
            .map_err(|e| TagError::Model {
                message: format!("Failed to register execution providers: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| TagError::Model {
                message: format!("Failed to load text encoder from {model_path:?}: {e}"),
            })?;

        let tokenizer =
            tokenizers::Tokenizer::from_file(tokenizer_path).map_err(|e| TagError::Model {
                message: format!("Failed to load tokenizer: {e}"),
            })?;

        let wants_attention_mask = session
            .inputs()
            .iter()
            .any(|i| i.name() == "attention_mask");

        tracing::debug!(
            "Loaded text encoder (inputs: {:?}, outputs: {:?})",
            session
                .inputs()
                .iter()
                .map(|i| i.name())
                .collect::<Vec<_>>(),
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            wants_attention_mask,
            context_length,
        })
    }

    /// Encode a batch of label strings to L2-normalized embeddings.
    ///
    /// Labels are tokenized as-is (no prompt template), padded to the longest
    /// sequence in the batch, and truncated at the context length.
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, TagError> {
        let batch_size = texts.len();
        if batch_size == 0 {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| TagError::Model {
                message: format!("Tokenization failed: {e}"),
            })?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(1)
            .min(self.context_length);

        // Flat [batch, seq_len] tensors, zero-padded on the right.
        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        for (i, encoding) in encodings.iter().enumerate() {
            for (j, &id) in encoding.get_ids().iter().take(seq_len).enumerate() {
                input_ids[i * seq_len + j] = id as i64;
                attention_mask[i * seq_len + j] = 1;
            }
        }

        let tensor_shape = vec![batch_size as i64, seq_len as i64];
        let ids_value =
            Value::from_array((tensor_shape.clone(), input_ids)).map_err(|e| TagError::Model {
                message: format!("Failed to create input_ids tensor: {e}"),
            })?;

        let mut session = self.session.lock().map_err(|e| TagError::Model {
            message: format!("Text encoder lock poisoned: {e}"),
        })?;

        let run = if self.wants_attention_mask {
            let mask_value =
                Value::from_array((tensor_shape, attention_mask)).map_err(|e| TagError::Model {
                    message: format!("Failed to create attention_mask tensor: {e}"),
                })?;
            session.run(ort::inputs!["input_ids" => ids_value, "attention_mask" => mask_value])
        } else {
            session.run(ort::inputs!["input_ids" => ids_value])
        };
        let outputs = run.map_err(|e| TagError::Model {
            message: format!("Text encoder inference failed: {e}"),
        })?;

        // Same preference rule as the vision side, so both halves read from
        // the projected space.
        let pairs: Vec<_> = outputs.iter().collect();
        let value =
            super::select_output(&pairs, &OUTPUT_PREFERENCE).ok_or_else(|| TagError::Model {
                message: "Text encoder produced no outputs".to_string(),
            })?;

        let (shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| TagError::Model {
                message: format!("Failed to extract text embedding tensor: {e}"),
            })?;

        // Embedding dimension comes from the output shape, never hard-coded.
        let embedding_dim = match shape.len() {
            2 => shape[1] as usize,
            1 => data.len() / batch_size,
            _ => {
                return Err(TagError::Model {
                    message: format!("Unexpected text embedding output shape: {shape:?}"),
                });
            }
        };

        let embeddings: Vec<Vec<f32>> = data
            .chunks(embedding_dim)
            .take(batch_size)
            .map(crate::math::l2_normalize)
            .collect();

        Ok(embeddings)
    }
}
