//! Turns a decoded photo into the classifier's fixed input tensor.
//!
//! The photo is centre-cropped to a square, resized to the model's declared
//! side length and laid out as `[1, H, W, 3]` (NHWC) or `[1, 3, H, W]`
//! (NCHW). Quantized models take raw 0-255 bytes; float models take
//! `(pixel / 255 - mean) / std` per channel.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;

use crate::config::{InputType, ModelConfig, TensorLayout};

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// Model input, in the element type the model declares.
#[derive(Debug, Clone, PartialEq)]
pub enum InputTensor {
    U8(Array4<u8>),
    F32(Array4<f32>),
}

impl InputTensor {
    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::U8(t) => t.shape(),
            InputTensor::F32(t) => t.shape(),
        }
    }
}

/// Largest centred square of `image`.
pub fn center_square(image: &DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    let side = width.min(height);
    image.crop_imm((width - side) / 2, (height - side) / 2, side, side)
}

/// Preprocess a photo for the configured model.
pub fn preprocess(image: &DynamicImage, model: &ModelConfig) -> InputTensor {
    let size = model.input_size;
    let rgb = center_square(image)
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8();
    let raw = rgb.as_raw();
    let side = size as usize;
    let at = move |y: usize, x: usize, c: usize| raw[(y * side + x) * CHANNELS + c];

    let shape = match model.layout {
        TensorLayout::Nhwc => (1, side, side, CHANNELS),
        TensorLayout::Nchw => (1, CHANNELS, side, side),
    };
    let layout = model.layout;
    let pixel = move |(_, a, b, c): (usize, usize, usize, usize)| match layout {
        TensorLayout::Nhwc => at(a, b, c),
        TensorLayout::Nchw => at(b, c, a),
    };
    let channel = move |(_, a, _, c): (usize, usize, usize, usize)| match layout {
        TensorLayout::Nhwc => c,
        TensorLayout::Nchw => a,
    };

    match model.input_type {
        InputType::U8 => InputTensor::U8(Array4::from_shape_fn(shape, pixel)),
        InputType::F32 => {
            let (mean, std) = (model.mean, model.std);
            InputTensor::F32(Array4::from_shape_fn(shape, |idx| {
                let c = channel(idx);
                (pixel(idx) as f32 / 255.0 - mean[c]) / std[c]
            }))
        }
    }
}
