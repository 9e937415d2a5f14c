//! CLIP vision encoder session management and inference.
//!
//! Loads the visual half of a CLIP ONNX export and runs single-image
//! inference to produce the image embedding vector.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::device::Device;
use crate::error::TagError;

/// Output names tried in order; falls back to the model's first output.
/// Projection exports emit `image_embeds`, plain encoder exports emit
/// `pooler_output`.
const OUTPUT_PREFERENCE: [&str; 2] = ["image_embeds", "pooler_output"];

/// Wraps an ONNX Runtime session for the CLIP vision encoder.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct VisionSession {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
}

impl VisionSession {
    /// Load the vision encoder from an ONNX file.
    pub fn load(model_path: &Path, device: Device) -> Result<Self, TagError> {
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
                message: format!("Failed to load vision encoder from {model_path:?}: {e}"),
            })?;

        // Detect the input tensor name from model metadata.
        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "pixel_values".to_string());

        tracing::debug!(
            "Loaded vision encoder from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Run inference on a preprocessed image tensor and return the embedding.
    ///
    /// Input shape: \[1, 3, image_size, image_size\] (NCHW, CLIP-normalized).
    /// Output: L2-normalized embedding vector; its length comes from the
    /// model's output shape (512 for the ViT-B variants).
    pub fn embed(&self, preprocessed: &Array4<f32>, path: &Path) -> Result<Vec<f32>, TagError> {
        // Convert ndarray to (shape, flat_data) for ort.
        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data)).map_err(|e| TagError::Embedding {
            path: path.to_path_buf(),
            message: format!("Failed to create input tensor: {e}"),
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| TagError::Embedding {
            path: path.to_path_buf(),
            message: format!("Session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| TagError::Embedding {
            path: path.to_path_buf(),
            message: format!("ONNX inference failed: {e}"),
        })?;

        // Prefer the projected embedding output; odd exports fall back to
        // whatever the model emits first.
        let pairs: Vec<_> = outputs.iter().collect();
        let value = super::select_output(&pairs, &OUTPUT_PREFERENCE).ok_or_else(|| {
            TagError::Embedding {
                path: path.to_path_buf(),
                message: "Vision encoder produced no outputs".to_string(),
            }
        })?;

        let (shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| TagError::Embedding {
                path: path.to_path_buf(),
                message: format!("Failed to extract embedding tensor: {e}"),
            })?;

        // Output is [1, dim]; take the single embedding vector.
        let mut raw = match shape.len() {
            1 => data.to_vec(),
            2 => {
                let dim = shape[1] as usize;
                data[..dim].to_vec()
            }
            _ => {
                return Err(TagError::Embedding {
                    path: path.to_path_buf(),
                    message: format!("Unexpected embedding output shape: {shape:?}"),
                });
            }
        };

        crate::math::l2_normalize_in_place(&mut raw);
        Ok(raw)
    }
}
