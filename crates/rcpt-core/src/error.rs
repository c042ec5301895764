//! Error types for the rcpt-core library.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// Failed to turn an input file into text.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Receipt failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Receipt store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors produced while turning an input file into text.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The file extension is not one we know how to read.
    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(String),

    /// Reading the file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Decoding the image failed.
    #[error("failed to open image: {0}")]
    Image(#[from] image::ImageError),

    /// PDF rasterization failed.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Text recognition failed.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),
}

impl SourceError {
    /// Whether this is the non-fatal "unsupported format" outcome.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, SourceError::UnsupportedFormat(_))
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to render or extract page images.
    #[error("failed to rasterize PDF: {0}")]
    Rasterize(String),

    /// Failed to extract the embedded text layer.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// I/O error while staging pages.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The OCR backend could not be started.
    #[error("failed to run OCR backend: {0}")]
    Backend(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Image preprocessing or staging failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),
}

/// A single field-level validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Date is not in DD/MM/YYYY format.
    #[error("date must be in DD/MM/YYYY format (got {0:?})")]
    InvalidDate(String),

    /// Amount is negative.
    #[error("amount must be non-negative (got {0})")]
    NegativeAmount(Decimal),

    /// Amount exceeds what the store keeps exactly.
    #[error("amount must not exceed {max} (got {amount})")]
    AmountTooLarge { amount: Decimal, max: Decimal },

    /// Amount could not be read as a number.
    #[error("amount must be a number (got {0:?})")]
    InvalidAmount(String),

    /// Currency code is not supported.
    #[error("currency must be INR or USD (got {0:?})")]
    InvalidCurrency(String),
}

impl ValidationError {
    /// Name of the field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidDate(_) => "date",
            ValidationError::NegativeAmount(_)
            | ValidationError::AmountTooLarge { .. }
            | ValidationError::InvalidAmount(_) => "amount",
            ValidationError::InvalidCurrency(_) => "currency",
        }
    }
}

/// All validation failures for one receipt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Whether any error refers to the given field.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Errors related to the receipt store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row could not be decoded.
    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    /// The store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
