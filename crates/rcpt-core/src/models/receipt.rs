//! Receipt data models.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel used for text fields that could not be detected.
pub const UNKNOWN: &str = "Unknown";

/// Supported receipt currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Indian rupee.
    #[default]
    #[serde(rename = "INR")]
    Inr,
    /// US dollar.
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            "USD" => Ok(Currency::Usd),
            other => Err(other.to_string()),
        }
    }
}

/// Fields recovered from receipt text.
///
/// Every field is always populated: values that could not be detected hold
/// their sentinel default ([`UNKNOWN`], zero, [`Currency::Inr`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedReceipt {
    /// Vendor name, title-cased.
    pub vendor: String,

    /// Date exactly as it appeared in the text. Not guaranteed to parse.
    pub date: String,

    /// Total amount. Never negative.
    pub amount: Decimal,

    /// Currency of the total.
    pub currency: Currency,
}

impl ExtractedReceipt {
    /// A receipt holding only default values.
    pub fn new() -> Self {
        Self {
            vendor: UNKNOWN.to_string(),
            date: UNKNOWN.to_string(),
            amount: Decimal::ZERO,
            currency: Currency::default(),
        }
    }

    /// Names of the fields that still hold their default value.
    pub fn defaulted_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.vendor == UNKNOWN {
            fields.push("vendor");
        }
        if self.date == UNKNOWN {
            fields.push("date");
        }
        if self.amount.is_zero() {
            fields.push("amount");
        }
        fields
    }
}

impl Default for ExtractedReceipt {
    fn default() -> Self {
        Self::new()
    }
}

/// A receipt as read back from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReceipt {
    /// Store-assigned identifier.
    pub id: i64,
    pub vendor: String,
    /// Date in DD/MM/YYYY format.
    pub date: String,
    pub amount: Decimal,
    pub currency: Currency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let receipt = ExtractedReceipt::default();
        assert_eq!(receipt.vendor, "Unknown");
        assert_eq!(receipt.date, "Unknown");
        assert_eq!(receipt.amount, Decimal::ZERO);
        assert_eq!(receipt.currency, Currency::Inr);
        assert_eq!(receipt.defaulted_fields(), vec!["vendor", "date", "amount"]);
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("inr".parse::<Currency>(), Ok(Currency::Inr));
        assert_eq!(" USD ".parse::<Currency>(), Ok(Currency::Usd));
        assert!("EUR".parse::<Currency>().is_err());
    }

    #[test]
    fn test_currency_serialization() {
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
        let receipt = ExtractedReceipt::default();
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["vendor"], "Unknown");
    }
}
