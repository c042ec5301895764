//! Labels and regex patterns for receipt line rules.

use lazy_static::lazy_static;
use regex::Regex;

/// Lowercase prefix of a vendor line.
pub const VENDOR_LABEL: &str = "vendor:";

/// Lowercase prefix of a date line.
pub const DATE_LABEL: &str = "date:";

/// Lowercase phrase marking the line that carries the total.
pub const TOTAL_LABEL: &str = "total amount";

/// Lowercase marker for rupee amounts (matches "Rs", "Rs.", "INRs" alike).
pub const RUPEE_ABBREVIATION: &str = "rs";

/// Rupee symbol; marks an INR amount.
pub const RUPEE_SIGN: char = '₹';

/// Dollar symbol; marks a USD amount.
pub const DOLLAR_SIGN: char = '$';

lazy_static! {
    // Digit groups loosely separated by commas, up to two fractional digits.
    // The class `[,\d{3}]` also admits braces; such matches fail to parse and
    // read as zero.
    pub static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"(\d{1,3}(?:[,\d{3}]*)(?:\.\d{1,2})?)"
    ).unwrap();
}
