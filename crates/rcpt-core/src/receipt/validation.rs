//! Validation applied before a receipt is persisted.
//!
//! Extraction tolerates dates it cannot read so that a person can correct
//! them; persistence does not. [`ValidatedReceipt`] can only be built by
//! passing these checks.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::error::{ValidationError, ValidationErrors};
use crate::models::receipt::{Currency, ExtractedReceipt};

/// Accepted date format (DD/MM/YYYY).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Largest accepted amount. Amounts are stored as REAL, and up to this
/// magnitude two fractional digits survive the round trip.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// A receipt whose date and amount passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedReceipt {
    vendor: String,
    date: String,
    #[serde(skip)]
    calendar_date: NaiveDate,
    amount: Decimal,
    currency: Currency,
}

impl ValidatedReceipt {
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Date as entered, in DD/MM/YYYY format.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Parsed calendar date.
    pub fn calendar_date(&self) -> NaiveDate {
        self.calendar_date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }
}

impl TryFrom<ExtractedReceipt> for ValidatedReceipt {
    type Error = ValidationErrors;

    fn try_from(receipt: ExtractedReceipt) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let calendar_date = check_date(&receipt.date);
        if let Err(e) = check_amount(receipt.amount) {
            errors.push(e);
        }

        let calendar_date = match calendar_date {
            Ok(date) if errors.is_empty() => date,
            Ok(_) => return Err(ValidationErrors(errors)),
            Err(e) => {
                errors.insert(0, e);
                return Err(ValidationErrors(errors));
            }
        };

        Ok(Self {
            vendor: receipt.vendor,
            date: receipt.date,
            calendar_date,
            amount: receipt.amount,
            currency: receipt.currency,
        })
    }
}

/// Validate a receipt without consuming it.
pub fn validate(receipt: &ExtractedReceipt) -> Result<ValidatedReceipt, ValidationErrors> {
    ValidatedReceipt::try_from(receipt.clone())
}

fn check_date(date: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))
}

fn check_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::NegativeAmount(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge {
            amount,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

/// Human-editable receipt fields, as typed into a form or on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptDraft {
    pub vendor: String,
    pub date: String,
    pub amount: String,
    pub currency: String,
}

impl ReceiptDraft {
    /// Replace the vendor.
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Replace the date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Replace the amount.
    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }

    /// Replace the currency code.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Check every field and build a [`ValidatedReceipt`].
    pub fn validate(self) -> Result<ValidatedReceipt, ValidationErrors> {
        let mut errors = Vec::new();

        let calendar_date = match check_date(self.date.trim()) {
            Ok(date) => Some(date),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let amount = match Decimal::from_str(self.amount.trim()) {
            Ok(amount) => {
                if let Err(e) = check_amount(amount) {
                    errors.push(e);
                }
                amount
            }
            Err(_) => {
                errors.push(ValidationError::InvalidAmount(self.amount.clone()));
                Decimal::ZERO
            }
        };

        let currency = match Currency::from_str(&self.currency) {
            Ok(currency) => currency,
            Err(_) => {
                errors.push(ValidationError::InvalidCurrency(self.currency.clone()));
                Currency::default()
            }
        };

        let calendar_date = match calendar_date {
            Some(date) if errors.is_empty() => date,
            _ => return Err(ValidationErrors(errors)),
        };

        Ok(ValidatedReceipt {
            vendor: self.vendor.trim().to_string(),
            date: self.date.trim().to_string(),
            calendar_date,
            amount,
            currency,
        })
    }
}

impl From<&ExtractedReceipt> for ReceiptDraft {
    fn from(receipt: &ExtractedReceipt) -> Self {
        Self {
            vendor: receipt.vendor.clone(),
            date: receipt.date.clone(),
            amount: receipt.amount.to_string(),
            currency: receipt.currency.code().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn receipt(date: &str, amount: &str) -> ExtractedReceipt {
        ExtractedReceipt {
            vendor: "Acme".to_string(),
            date: date.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            currency: Currency::Usd,
        }
    }

    #[test]
    fn test_valid_receipt() {
        let validated = validate(&receipt("25/12/2024", "10.0")).unwrap();
        assert_eq!(validated.date(), "25/12/2024");
        assert_eq!(
            validated.calendar_date(),
            NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
        );
        assert_eq!(validated.currency(), Currency::Usd);
    }

    #[test]
    fn test_iso_date_rejected() {
        let errors = validate(&receipt("2024-12-25", "10.0")).unwrap_err();
        assert_eq!(
            errors.0,
            vec![ValidationError::InvalidDate("2024-12-25".to_string())]
        );
        assert!(errors.has_field("date"));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let errors = validate(&receipt("25/12/2024", "-5.0")).unwrap_err();
        assert!(errors.has_field("amount"));
        assert!(!errors.has_field("date"));
    }

    #[test]
    fn test_unknown_date_rejected() {
        let errors = validate(&ExtractedReceipt::default()).unwrap_err();
        assert!(errors.has_field("date"));
        assert!(errors.to_string().contains("DD/MM/YYYY"));
    }

    #[test]
    fn test_impossible_date_rejected() {
        assert!(validate(&receipt("31/02/2024", "1")).is_err());
    }

    #[test]
    fn test_zero_amount_allowed() {
        assert!(validate(&receipt("01/01/2024", "0")).is_ok());
    }

    #[test]
    fn test_max_amount_is_one_trillion() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000i64));
    }

    #[test]
    fn test_oversized_extracted_total_rejected() {
        let extracted = crate::receipt::extract(
            "Date: 01/01/2024\nTotal Amount: 79228162514264337593543950335",
        );
        assert_eq!(extracted.amount, Decimal::MAX);

        let errors = validate(&extracted).unwrap_err();
        assert_eq!(
            errors.0,
            vec![ValidationError::AmountTooLarge {
                amount: Decimal::MAX,
                max: MAX_AMOUNT,
            }]
        );
        assert!(errors.has_field("amount"));
    }

    #[test]
    fn test_amount_at_bound_allowed() {
        assert!(validate(&receipt("01/01/2024", "1000000000000")).is_ok());
        assert!(validate(&receipt("01/01/2024", "1000000000000.01")).is_err());
    }

    #[test]
    fn test_draft_rejects_oversized_amount() {
        let errors = ReceiptDraft::from(&receipt("01/01/2024", "1"))
            .with_amount("50000000000000000000000000000")
            .validate()
            .unwrap_err();
        assert!(errors.has_field("amount"));
    }

    #[test]
    fn test_all_errors_reported() {
        let errors = validate(&receipt("Unknown", "-1")).unwrap_err();
        assert_eq!(errors.0.len(), 2);
    }

    #[test]
    fn test_draft_corrects_extracted_receipt() {
        let extracted = ExtractedReceipt::default();
        let validated = ReceiptDraft::from(&extracted)
            .with_vendor("Corner Shop")
            .with_date("03/04/2024")
            .with_amount("12.50")
            .with_currency("usd")
            .validate()
            .unwrap();

        assert_eq!(validated.vendor(), "Corner Shop");
        assert_eq!(validated.amount(), Decimal::from_str("12.50").unwrap());
        assert_eq!(validated.currency(), Currency::Usd);
    }

    #[test]
    fn test_draft_rejects_bad_fields() {
        let errors = ReceiptDraft::from(&receipt("01/01/2024", "1"))
            .with_amount("ten")
            .with_currency("EUR")
            .validate()
            .unwrap_err();

        assert_eq!(
            errors.0,
            vec![
                ValidationError::InvalidAmount("ten".to_string()),
                ValidationError::InvalidCurrency("EUR".to_string()),
            ]
        );
    }
}
