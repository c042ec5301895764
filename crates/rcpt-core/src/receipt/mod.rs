//! Receipt field extraction and validation.

mod parser;
pub mod rules;
mod validation;

pub use parser::{extract, ExtractionResult, LineRuleExtractor, ReceiptParser};
pub use validation::{validate, ReceiptDraft, ValidatedReceipt, DATE_FORMAT, MAX_AMOUNT};

pub use crate::error::{ValidationError, ValidationErrors};
