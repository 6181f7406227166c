//! Converting photos to and from the quantized input format
//!
//! Grayscale, resize to 96×96, normalize to [0, 1], then quantize with
//! scale 1/128 (exponent -7).

use std::path::Path;

use image::imageops::FilterType;
use image::{GrayImage, ImageError};
use thiserror::Error;

use crate::input::{IMAGE_SIZE, INPUT_LEN};

/// Image preparation errors
#[derive(Error, Debug)]
pub enum ImagePrepError {
    #[error("Image processing failed: {0}")]
    Image(#[from] ImageError),

    #[error("Expected {expected} quantized pixels, got {actual}")]
    Size { expected: usize, actual: usize },
}

/// Load an image file and quantize it into model input
pub fn quantize_image(path: &Path) -> Result<Vec<i8>, ImagePrepError> {
    let img = image::open(path)?;
    Ok(quantize_gray(&img.to_luma8()))
}

/// Quantize a grayscale image of any size into model input
pub fn quantize_gray(gray: &GrayImage) -> Vec<i8> {
    let size = IMAGE_SIZE as u32;
    let resized = image::imageops::resize(gray, size, size, FilterType::Triangle);
    resized.pixels().map(|p| quantize_pixel(p[0])).collect()
}

fn quantize_pixel(value: u8) -> i8 {
    let normalized = value as f32 / 255.0;
    // White maps to 128, which does not fit; clamp instead of wrapping
    (normalized * 128.0).min(i8::MAX as f32) as i8
}

/// Turn quantized input back into a viewable 96×96 grayscale image
pub fn reconstruct_image(data: &[i8]) -> Result<GrayImage, ImagePrepError> {
    if data.len() != INPUT_LEN {
        return Err(ImagePrepError::Size {
            expected: INPUT_LEN,
            actual: data.len(),
        });
    }

    let pixels = data
        .iter()
        .map(|&q| (q as f32 / 128.0 * 255.0).clamp(0.0, 255.0) as u8)
        .collect();

    GrayImage::from_raw(IMAGE_SIZE as u32, IMAGE_SIZE as u32, pixels).ok_or(ImagePrepError::Size {
        expected: INPUT_LEN,
        actual: data.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TEST_IMAGE;
    use image::Luma;

    #[test]
    fn test_quantize_pixel_range() {
        assert_eq!(quantize_pixel(0), 0);
        assert_eq!(quantize_pixel(128), 64);
        assert_eq!(quantize_pixel(254), 127);
        assert_eq!(quantize_pixel(255), 127);
    }

    #[test]
    fn test_quantize_resizes() {
        let gray = GrayImage::from_pixel(320, 240, Luma([200]));
        let data = quantize_gray(&gray);
        assert_eq!(data.len(), INPUT_LEN);
        // 200 / 255 * 128 = 100.4, give or take filter rounding
        assert!(data.iter().all(|&q| (q - 100).abs() <= 1));
    }

    #[test]
    fn test_reconstruct_embedded_image() {
        let img = reconstruct_image(&TEST_IMAGE).unwrap();
        assert_eq!(img.dimensions(), (96, 96));

        let requantized = quantize_gray(&img);
        for (a, b) in requantized.iter().zip(TEST_IMAGE.iter()) {
            assert!((*a as i16 - *b as i16).abs() <= 1);
        }
    }

    #[test]
    fn test_reconstruct_rejects_wrong_size() {
        let err = reconstruct_image(&[0i8; 10]).unwrap_err();
        assert!(matches!(err, ImagePrepError::Size { expected: 9216, actual: 10 }));
    }

    #[test]
    fn test_quantize_image_file() {
        let path = std::env::temp_dir().join(format!("gesture-input-{}.png", std::process::id()));
        GrayImage::from_pixel(96, 96, Luma([255])).save(&path).unwrap();

        let data = quantize_image(&path).unwrap();
        assert_eq!(data.len(), INPUT_LEN);
        assert!(data.iter().all(|&q| q == 127));
    }
}
