//! Core library for receipt OCR processing.
//!
//! This crate provides:
//! - Text sources for plain-text, image and PDF receipts (OCR via pluggable backends)
//! - Line-oriented receipt field extraction (vendor, date, amount, currency)
//! - Validation before persistence
//! - A receipt store (SQLite or in-memory) and reporting helpers

pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod receipt;
pub mod report;
pub mod source;
pub mod store;

pub use error::{RcptError, Result};
pub use models::config::RcptConfig;
pub use models::receipt::{Currency, ExtractedReceipt, StoredReceipt, UNKNOWN};
pub use ocr::TextRecognizer;
pub use pdf::PdfRasterizer;
pub use receipt::{
    extract, validate, ExtractionResult, LineRuleExtractor, ReceiptDraft, ReceiptParser,
    ValidatedReceipt, ValidationError, ValidationErrors,
};
pub use report::{monthly_totals, top_vendors, ReceiptFilter, SortOrder, Summary};
pub use source::{render_for_display, SourceKind, TextSource};
pub use store::{MemoryStore, ReceiptStore, SqliteStore};
