//! Turning receipt files into text.
//!
//! Plain-text receipts are read as-is. Images are preprocessed and passed
//! to a [`TextRecognizer`]; PDFs are rasterized page by page first, unless
//! their embedded text layer is preferred and long enough.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{RcptError, SourceError};
use crate::models::config::RcptConfig;
use crate::ocr::{recognizer_from_config, ImagePreprocessor, TextRecognizer};
use crate::pdf::{rasterizer_from_config, text_layer, PdfRasterizer};

/// Message shown for files with an unsupported extension.
pub const UNSUPPORTED_MESSAGE: &str = "Unsupported file format.";

/// Kind of input file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    Pdf,
    Image,
}

impl SourceKind {
    /// Classify a path by its (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match extension(path).as_str() {
            "txt" => Some(SourceKind::Text),
            "pdf" => Some(SourceKind::Pdf),
            "jpg" | "jpeg" | "png" => Some(SourceKind::Image),
            _ => None,
        }
    }

    /// Whether a path has a supported extension.
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_some()
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Text source dispatching on file kind.
pub struct TextSource {
    recognizer: Box<dyn TextRecognizer>,
    rasterizer: Box<dyn PdfRasterizer>,
    preprocessor: ImagePreprocessor,
    prefer_embedded_text: bool,
    min_text_length: usize,
}

impl TextSource {
    /// Create a source with the given backends and default preprocessing.
    pub fn new(recognizer: Box<dyn TextRecognizer>, rasterizer: Box<dyn PdfRasterizer>) -> Self {
        Self {
            recognizer,
            rasterizer,
            preprocessor: ImagePreprocessor::default(),
            prefer_embedded_text: false,
            min_text_length: 20,
        }
    }

    /// Create a source from configuration.
    pub fn from_config(config: &RcptConfig) -> Result<Self, RcptError> {
        let recognizer = recognizer_from_config(&config.ocr).map_err(SourceError::from)?;
        let rasterizer = rasterizer_from_config(&config.pdf);

        debug!(
            "Text source using {} recognizer and {} rasterizer",
            recognizer.name(),
            rasterizer.name()
        );

        Ok(Self {
            recognizer,
            rasterizer,
            preprocessor: ImagePreprocessor::from_config(&config.ocr),
            prefer_embedded_text: config.pdf.prefer_embedded_text,
            min_text_length: config.pdf.min_text_length,
        })
    }

    /// Set the image preprocessor.
    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Use a PDF's text layer when it has at least `min_text_length`
    /// non-whitespace characters.
    pub fn with_embedded_text(mut self, min_text_length: usize) -> Self {
        self.prefer_embedded_text = true;
        self.min_text_length = min_text_length;
        self
    }

    /// Extract the text content of a receipt file.
    pub fn extract_text(&self, path: &Path) -> Result<String, SourceError> {
        let start = Instant::now();

        let kind = SourceKind::from_path(path)
            .ok_or_else(|| SourceError::UnsupportedFormat(extension(path)))?;

        info!("Extracting text from {} ({:?})", path.display(), kind);

        let text = match kind {
            SourceKind::Text => read_text(path)?,
            SourceKind::Image => self.image_text(path)?,
            SourceKind::Pdf => self.pdf_text(path)?,
        };

        debug!(
            "Extracted {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }

    fn image_text(&self, path: &Path) -> Result<String, SourceError> {
        let image = image::open(path)?;
        let prepared = self.preprocessor.prepare(&image);
        Ok(self.recognizer.recognize(&prepared)?)
    }

    fn pdf_text(&self, path: &Path) -> Result<String, SourceError> {
        if self.prefer_embedded_text {
            match text_layer(path, self.min_text_length) {
                Ok(Some(text)) => {
                    info!("Using embedded text layer of {}", path.display());
                    return Ok(text);
                }
                Ok(None) => debug!("Text layer too short, falling back to OCR"),
                Err(e) => warn!("Text layer unavailable ({}), falling back to OCR", e),
            }
        }

        let pages = self.rasterizer.rasterize(path)?;

        let texts = pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                debug!("Recognizing page {}/{}", i + 1, pages.len());
                self.recognizer.recognize(page)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(texts.join("\n"))
    }
}

fn read_text(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Render an extraction outcome for display.
///
/// Unsupported files show a fixed notice, other failures are prefixed with
/// `[ERROR]`.
pub fn render_for_display(result: &Result<String, SourceError>) -> String {
    match result {
        Ok(text) => text.clone(),
        Err(e) if e.is_unsupported() => UNSUPPORTED_MESSAGE.to_string(),
        Err(e) => format!("[ERROR] {}", e),
    }
}
