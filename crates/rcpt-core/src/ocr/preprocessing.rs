//! Image preprocessing for OCR.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

use crate::models::config::OcrConfig;

/// 3x3 sharpening kernel, normalized by its sum (16).
pub const SHARPEN_KERNEL: [i32; 9] = [-2, -2, -2, -2, 32, -2, -2, -2, -2];

/// Image preprocessor: grayscale, binarize, sharpen.
pub struct ImagePreprocessor {
    /// Pixels below this value become black, the rest white.
    threshold: u8,
    /// Apply the sharpening filter after binarization.
    sharpen: bool,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self {
            threshold: 150,
            sharpen: true,
        }
    }

    /// Create a preprocessor from OCR configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            threshold: config.binarize_threshold,
            sharpen: config.sharpen,
        }
    }

    /// Set the binarization threshold.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enable or disable sharpening.
    pub fn with_sharpen(mut self, sharpen: bool) -> Self {
        self.sharpen = sharpen;
        self
    }

    /// Prepare an image for text recognition.
    pub fn prepare(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        debug!(
            "Preprocessing {}x{} image (threshold {}, sharpen {})",
            width, height, self.threshold, self.sharpen
        );

        let mut gray = image.to_luma8();
        binarize(&mut gray, self.threshold);

        let gray = if self.sharpen { sharpen(&gray) } else { gray };

        DynamicImage::ImageLuma8(gray)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn binarize(image: &mut GrayImage, threshold: u8) {
    for pixel in image.pixels_mut() {
        pixel[0] = if pixel[0] < threshold { 0 } else { 255 };
    }
}

/// Convolve with [`SHARPEN_KERNEL`], replicating edge pixels.
fn sharpen(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);
    let divisor: i32 = SHARPEN_KERNEL.iter().sum();

    for y in 0..height {
        for x in 0..width {
            let mut acc = 0i32;

            for (i, weight) in SHARPEN_KERNEL.iter().enumerate() {
                let dx = (i % 3) as i64 - 1;
                let dy = (i / 3) as i64 - 1;
                let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                acc += weight * image.get_pixel(sx, sy)[0] as i32;
            }

            let value = (acc / divisor).clamp(0, 255) as u8;
            result.put_pixel(x, y, Luma([value]));
        }
    }

    result
}
