//! Text recognition backends.
//!
//! Any engine that turns an image into text can drive the pipeline; the
//! backend is picked from [`OcrConfig`] at startup.

#[cfg(feature = "native")]
mod onnx;
mod preprocessing;
mod tesseract;

#[cfg(feature = "native")]
pub use onnx::OnnxRecognizer;
pub use preprocessing::{ImagePreprocessor, SHARPEN_KERNEL};
pub use tesseract::TesseractRecognizer;

use image::DynamicImage;

use crate::error::OcrError;
use crate::models::config::{OcrBackendKind, OcrConfig};

/// Trait for OCR engines.
pub trait TextRecognizer: Send + Sync {
    /// Engine name used in logs.
    fn name(&self) -> &'static str;

    /// Recognize all text in an image.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Create the recognizer selected by the configuration.
pub fn recognizer_from_config(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, OcrError> {
    match config.backend {
        OcrBackendKind::Tesseract => Ok(Box::new(TesseractRecognizer::from_config(config))),
        #[cfg(feature = "native")]
        OcrBackendKind::Onnx => Ok(Box::new(OnnxRecognizer::from_config(config)?)),
        #[cfg(not(feature = "native"))]
        OcrBackendKind::Onnx => Err(OcrError::Backend(
            "ONNX backend requires the `native` feature".to_string(),
        )),
    }
}
