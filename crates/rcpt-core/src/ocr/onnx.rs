//! Pure Rust OCR using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::TextRecognizer;

/// Height of a reading-order row, in pixels.
const ROW_HEIGHT: f64 = 20.0;

/// Recognizer backed by PaddleOCR models run through `pure-onnx-ocr`.
pub struct OnnxRecognizer {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
    keep_unk: bool,
}

/// A recognized line and the top-left corner of its box.
struct Fragment {
    x: f64,
    y: f64,
    text: String,
}

impl OnnxRecognizer {
    /// Load det.onnx, latin_rec.onnx and latin_dict.txt from a directory.
    pub fn from_dir(model_dir: &Path, keep_unk: bool) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded ONNX OCR models from {}", model_dir.display());

        Ok(Self {
            engine: Mutex::new(engine),
            keep_unk,
        })
    }

    /// Create a recognizer from OCR configuration.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        Self::from_dir(&config.model_dir, config.keep_unk)
    }
}

impl TextRecognizer for OnnxRecognizer {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!("Recognizing {}x{} image", width, height);

        let results = {
            let engine = self
                .engine
                .lock()
                .map_err(|_| OcrError::Recognition("engine lock poisoned".to_string()))?;
            engine
                .run_from_image(image)
                .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?
        };

        let mut fragments: Vec<Fragment> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Fragment { x, y, text }
            })
            .collect();

        sort_reading_order(&mut fragments);
        let text = join_rows(&fragments);

        info!(
            "ONNX OCR complete: {} regions in {}ms",
            fragments.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f64::MAX, f64::MAX), |(x, y), c| (x.min(c.x), y.min(c.y)))
}

impl Fragment {
    fn row(&self) -> i64 {
        (self.y / ROW_HEIGHT) as i64
    }
}

/// Top-to-bottom in rows of [`ROW_HEIGHT`], then left-to-right.
fn sort_reading_order(fragments: &mut [Fragment]) {
    fragments.sort_by(|a, b| {
        a.row()
            .cmp(&b.row())
            .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });
}

/// One output line per row; boxes within a row are separated by a space.
fn join_rows(sorted: &[Fragment]) -> String {
    sorted
        .chunk_by(|a, b| a.row() == b.row())
        .map(|row| {
            row.iter()
                .map(|f| f.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
