//! Currency detection on total lines.

use crate::models::receipt::Currency;

use super::patterns::{DOLLAR_SIGN, RUPEE_ABBREVIATION, RUPEE_SIGN};

/// Detect the currency of a total line. `lower` is the lowercase line.
///
/// Rupee markers win over the dollar sign. `None` leaves the current value
/// untouched.
pub fn detect_currency(line: &str, lower: &str) -> Option<Currency> {
    if lower.contains(RUPEE_ABBREVIATION) || line.contains(RUPEE_SIGN) {
        Some(Currency::Inr)
    } else if line.contains(DOLLAR_SIGN) {
        Some(Currency::Usd)
    } else {
        None
    }
}
