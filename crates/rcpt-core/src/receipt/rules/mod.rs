//! Line rules for receipt field extraction.
//!
//! Each rule inspects one trimmed line and, when it recognizes it, writes the
//! field(s) it owns into the receipt being built. Rules are tried in priority
//! order and a line is consumed by the first rule that matches.

pub mod amounts;
pub mod currency;
pub mod labels;
pub mod patterns;

pub use amounts::{find_amount, parse_amount};
pub use currency::detect_currency;
pub use labels::{title_case, value_after_colon};
pub use patterns::*;

use crate::models::receipt::ExtractedReceipt;

/// A single line-matching rule.
pub trait LineRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply the rule to `line` (`lower` is its lowercase form).
    ///
    /// Returns `true` when the line was recognized, even if no usable value
    /// could be read from it.
    fn apply(&self, line: &str, lower: &str, receipt: &mut ExtractedReceipt) -> bool;
}

/// `Vendor: <name>` lines.
pub struct VendorRule;

impl LineRule for VendorRule {
    fn name(&self) -> &'static str {
        "vendor"
    }

    fn apply(&self, line: &str, lower: &str, receipt: &mut ExtractedReceipt) -> bool {
        if !lower.starts_with(VENDOR_LABEL) {
            return false;
        }
        receipt.vendor = title_case(value_after_colon(line));
        true
    }
}

/// `Date: <anything>` lines. The value is kept verbatim.
pub struct DateRule;

impl LineRule for DateRule {
    fn name(&self) -> &'static str {
        "date"
    }

    fn apply(&self, line: &str, lower: &str, receipt: &mut ExtractedReceipt) -> bool {
        if !lower.starts_with(DATE_LABEL) {
            return false;
        }
        receipt.date = value_after_colon(line).to_string();
        true
    }
}

/// Lines mentioning "total amount" carry both the currency and the amount.
pub struct TotalAmountRule;

impl LineRule for TotalAmountRule {
    fn name(&self) -> &'static str {
        "total"
    }

    fn apply(&self, line: &str, lower: &str, receipt: &mut ExtractedReceipt) -> bool {
        if !lower.contains(TOTAL_LABEL) {
            return false;
        }
        if let Some(currency) = detect_currency(line, lower) {
            receipt.currency = currency;
        }
        if let Some(amount) = find_amount(line) {
            receipt.amount = amount;
        }
        true
    }
}

/// The rules in priority order.
pub fn default_rules() -> Vec<Box<dyn LineRule>> {
    vec![Box::new(VendorRule), Box::new(DateRule), Box::new(TotalAmountRule)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::Currency;
    use rust_decimal::Decimal;

    fn apply(rule: &dyn LineRule, line: &str) -> (bool, ExtractedReceipt) {
        let mut receipt = ExtractedReceipt::new();
        let matched = rule.apply(line, &line.to_lowercase(), &mut receipt);
        (matched, receipt)
    }

    #[test]
    fn test_vendor_rule() {
        let (matched, receipt) = apply(&VendorRule, "VENDOR:   big BAZAAR ");
        assert!(matched);
        assert_eq!(receipt.vendor, "Big Bazaar");

        let (matched, _) = apply(&VendorRule, "Our vendor: nobody");
        assert!(!matched);
    }

    #[test]
    fn test_date_rule_keeps_value_verbatim() {
        let (matched, receipt) = apply(&DateRule, "Date: 2024-12-25 10:30");
        assert!(matched);
        assert_eq!(receipt.date, "2024-12-25 10:30");
    }

    #[test]
    fn test_total_rule_without_number_still_matches() {
        let (matched, receipt) = apply(&TotalAmountRule, "Total Amount: N/A");
        assert!(matched);
        assert_eq!(receipt.amount, Decimal::ZERO);
        assert_eq!(receipt.currency, Currency::Inr);
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<&str> = default_rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["vendor", "date", "total"]);
    }
}
