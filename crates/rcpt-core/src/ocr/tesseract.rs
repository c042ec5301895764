//! OCR through an external `tesseract` executable.

use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::TextRecognizer;

/// Recognizer that stages the image as a PNG and reads tesseract's stdout.
pub struct TesseractRecognizer {
    command: PathBuf,
    language: String,
}

impl TesseractRecognizer {
    /// Create a recognizer for the given executable and language code.
    pub fn new(command: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    /// Create a recognizer from OCR configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.tesseract_cmd.clone(), config.language.clone())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();

        let staged = tempfile::Builder::new()
            .prefix("rcpt-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Preprocessing(format!("failed to create temp file: {}", e)))?;

        image
            .save_with_format(staged.path(), ImageFormat::Png)
            .map_err(|e| OcrError::Preprocessing(format!("failed to stage image: {}", e)))?;

        debug!(
            "Running {} on {}",
            self.command.display(),
            staged.path().display()
        );

        let output = Command::new(&self.command)
            .arg(staged.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| OcrError::Backend(format!("{}: {}", self.command.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract exited with {}", output.status);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        info!(
            "tesseract recognized {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn test_missing_binary_is_backend_error() {
        let recognizer = TesseractRecognizer::new("/nonexistent/tesseract-binary", "eng");
        let image = DynamicImage::ImageLuma8(GrayImage::new(4, 4));

        let err = recognizer.recognize(&image).unwrap_err();
        assert!(matches!(err, OcrError::Backend(_)));
    }

    #[test]
    fn test_from_config() {
        let config = OcrConfig {
            language: "hin".to_string(),
            ..Default::default()
        };
        let recognizer = TesseractRecognizer::from_config(&config);
        assert_eq!(recognizer.language, "hin");
        assert_eq!(recognizer.command, PathBuf::from("tesseract"));
    }
}
