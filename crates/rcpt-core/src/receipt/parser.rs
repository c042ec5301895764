//! Line-oriented receipt parser.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::receipt::ExtractedReceipt;

use super::rules::{default_rules, LineRule};

/// Result of receipt extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted receipt. Always fully populated.
    pub receipt: ExtractedReceipt,
    /// Raw text the receipt was extracted from.
    pub raw_text: String,
    /// Fields that fell back to their defaults.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for receipt parsing.
///
/// Parsing never fails: fields that cannot be found keep their defaults.
pub trait ReceiptParser {
    /// Parse a receipt from text.
    fn parse(&self, text: &str) -> ExtractionResult;

    /// Parse a receipt from text, keeping only the record.
    fn extract(&self, text: &str) -> ExtractedReceipt {
        self.parse(text).receipt
    }
}

/// Parser applying [`LineRule`]s to each line in a single forward pass.
///
/// Later matches overwrite earlier ones, so the last `Vendor:` line wins.
pub struct LineRuleExtractor {
    rules: Vec<Box<dyn LineRule>>,
}

impl LineRuleExtractor {
    /// Create a parser with the vendor, date and total rules.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Create a parser with a custom rule set, tried in the given order.
    pub fn with_rules(rules: Vec<Box<dyn LineRule>>) -> Self {
        Self { rules }
    }

    fn scan(&self, text: &str) -> ExtractedReceipt {
        let mut receipt = ExtractedReceipt::new();

        for (index, raw_line) in text.split('\n').enumerate() {
            let line = raw_line.trim();
            let lower = line.to_lowercase();

            if let Some(rule) = self
                .rules
                .iter()
                .find(|rule| rule.apply(line, &lower, &mut receipt))
            {
                debug!("Line {} matched {} rule", index + 1, rule.name());
            }
        }

        receipt
    }
}

impl Default for LineRuleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptParser for LineRuleExtractor {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing receipt from {} characters of text", text.len());

        let receipt = self.scan(text);

        let warnings: Vec<String> = receipt
            .defaulted_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();

        debug!(
            "Extracted receipt: vendor={:?} date={:?} amount={} {}",
            receipt.vendor, receipt.date, receipt.amount, receipt.currency
        );

        ExtractionResult {
            receipt,
            raw_text: text.to_string(),
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Extract receipt fields from text with the default rules.
pub fn extract(text: &str) -> ExtractedReceipt {
    LineRuleExtractor::new().extract(text)
}
