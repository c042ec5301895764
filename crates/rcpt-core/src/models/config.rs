//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Receipt store configuration.
    pub store: StoreConfig,
}

/// Which OCR engine recognizes text in images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackendKind {
    /// External `tesseract` binary.
    #[default]
    Tesseract,
    /// Bundled pure-Rust ONNX models.
    Onnx,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// OCR engine to use.
    pub backend: OcrBackendKind,

    /// Path or name of the tesseract executable.
    pub tesseract_cmd: PathBuf,

    /// Tesseract language code.
    pub language: String,

    /// Directory holding det.onnx, latin_rec.onnx and latin_dict.txt.
    pub model_dir: PathBuf,

    /// Keep `[UNK]` markers emitted by the ONNX recognizer.
    pub keep_unk: bool,

    /// Pixels darker than this become black, the rest white.
    pub binarize_threshold: u8,

    /// Sharpen images after binarization.
    pub sharpen: bool,

    /// Upper bound for a single file's OCR, enforced by the host.
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendKind::Tesseract,
            tesseract_cmd: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            model_dir: PathBuf::from("models"),
            keep_unk: false,
            binarize_threshold: 150,
            sharpen: true,
            timeout_secs: 120,
        }
    }
}

/// How PDF pages become images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterizerKind {
    /// Render pages with poppler's `pdftoppm`.
    #[default]
    Poppler,
    /// Use the scanned image embedded in each page.
    Embedded,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Page rasterizer.
    pub rasterizer: RasterizerKind,

    /// Path or name of the pdftoppm executable.
    pub pdftoppm_cmd: PathBuf,

    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// Use the embedded text layer instead of OCR when it has enough text.
    pub prefer_embedded_text: bool,

    /// Minimum non-whitespace characters for the text layer to be used.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            rasterizer: RasterizerKind::Poppler,
            pdftoppm_cmd: PathBuf::from("pdftoppm"),
            render_dpi: 200,
            max_pages: 0,
            prefer_embedded_text: false,
            min_text_length: 20,
        }
    }
}

/// Receipt store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. When unset the CLI picks a per-user location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
