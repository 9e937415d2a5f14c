//! Image preprocessing for CLIP embedding generation.
//!
//! CLIP ViT-B expects:
//! - Shortest side resized to the input size, then a center crop
//! - Channel order: RGB, pixels scaled to [0, 1]
//! - Per-channel normalization with the CLIP mean/std
//! - Tensor layout: NCHW [batch, channels, height, width]

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// CLIP normalization mean (R, G, B).
const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP normalization std (R, G, B).
const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Resize so the shortest side equals `size`, then crop the center square.
fn resize_and_crop(image: &DynamicImage, size: u32) -> RgbImage {
    let (width, height) = (image.width(), image.height());
    let scale = size as f32 / width.min(height) as f32;
    let new_width = ((width as f32 * scale).round() as u32).max(size);
    let new_height = ((height as f32 * scale).round() as u32).max(size);

    let resized = image.resize_exact(new_width, new_height, FilterType::CatmullRom);
    let x = (new_width - size) / 2;
    let y = (new_height - size) / 2;
    resized.crop_imm(x, y, size, size).to_rgb8()
}

/// Preprocess an image for CLIP inference.
///
/// Resizes the shortest side to `image_size`, center-crops to
/// `image_size × image_size`, converts to RGB, applies CLIP normalization,
/// and returns an NCHW tensor suitable for ONNX Runtime.
pub fn preprocess(image: &DynamicImage, image_size: u32) -> Array4<f32> {
    let rgb = resize_and_crop(image, image_size);

    let size = image_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, size, size));

    // Access raw RGB bytes and the tensor slice directly to avoid per-pixel
    // bounds-checking overhead from get_pixel() and 4D ndarray indexing.
    let raw = rgb.as_raw();
    let tensor_data = tensor.as_slice_mut().unwrap();
    for (i, pixel) in raw.chunks_exact(3).enumerate() {
        let y = i / size;
        let x = i % size;
        for (c, &val) in pixel.iter().enumerate() {
            // NCHW layout: offset = c * size * size + y * size + x
            let idx = c * size * size + y * size + x;
            tensor_data[idx] = (val as f32 / 255.0 - CLIP_MEAN[c]) / CLIP_STD[c];
        }
    }

    tensor
}
