//! Amount extraction from total lines.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT_PATTERN;

/// Find the first amount on a line.
///
/// Returns `None` when nothing on the line looks like a number. A match that
/// does not parse yields zero rather than an error.
pub fn find_amount(line: &str) -> Option<Decimal> {
    AMOUNT_PATTERN
        .captures(line)
        .map(|caps| parse_amount(&caps[1]))
}

/// Parse a comma-grouped amount such as `1,234.50`.
pub fn parse_amount(s: &str) -> Decimal {
    let cleaned = s.replace(',', "");
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.50"), dec("1234.50"));
        assert_eq!(parse_amount("99.99"), dec("99.99"));
        assert_eq!(parse_amount("12,34,567"), dec("1234567"));
        assert_eq!(parse_amount("7"), dec("7"));
    }

    #[test]
    fn test_unparseable_match_is_zero() {
        assert_eq!(parse_amount("12{3}"), Decimal::ZERO);
        assert_eq!(find_amount("Total Amount: 1{3}"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_find_amount_takes_first_match() {
        assert_eq!(find_amount("Total Amount: Rs. 1,234.50"), Some(dec("1234.50")));
        assert_eq!(find_amount("Total Amount 2 items 45.00"), Some(dec("2")));
    }

    #[test]
    fn test_find_amount_without_digits() {
        assert_eq!(find_amount("Total Amount: N/A"), None);
    }

    #[test]
    fn test_loose_grouping_is_kept() {
        // Comma placement is not enforced.
        assert_eq!(find_amount("total amount 1,2,3.4"), Some(dec("123.4")));
        // Only two fractional digits are taken.
        assert_eq!(find_amount("total amount 5.678"), Some(dec("5.67")));
    }
}
