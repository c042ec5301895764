//! Output formats for extracted receipts.

use rust_decimal::Decimal;
use serde::Serialize;

use rcpt_core::{Currency, ExtractedReceipt, ValidatedReceipt};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for files written in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Receipt fields as shown to the user.
#[derive(Debug, Serialize)]
pub struct ReceiptView<'a> {
    pub vendor: &'a str,
    pub date: &'a str,
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<&'a str>,
}

impl<'a> ReceiptView<'a> {
    /// Attach the raw text the receipt was extracted from.
    pub fn with_raw_text(mut self, raw_text: &'a str) -> Self {
        self.raw_text = Some(raw_text);
        self
    }
}

impl<'a> From<&'a ExtractedReceipt> for ReceiptView<'a> {
    fn from(receipt: &'a ExtractedReceipt) -> Self {
        Self {
            vendor: &receipt.vendor,
            date: &receipt.date,
            amount: receipt.amount,
            currency: receipt.currency,
            raw_text: None,
        }
    }
}

impl<'a> From<&'a ValidatedReceipt> for ReceiptView<'a> {
    fn from(receipt: &'a ValidatedReceipt) -> Self {
        Self {
            vendor: receipt.vendor(),
            date: receipt.date(),
            amount: receipt.amount(),
            currency: receipt.currency(),
            raw_text: None,
        }
    }
}

pub fn format_receipt(view: &ReceiptView<'_>, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
        OutputFormat::Csv => format_csv(view),
        OutputFormat::Text => Ok(format_text(view)),
    }
}

fn format_csv(view: &ReceiptView<'_>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["vendor", "date", "amount", "currency"];
    let amount = view.amount.to_string();
    let mut record = vec![view.vendor, view.date, amount.as_str(), view.currency.code()];

    if let Some(raw) = view.raw_text {
        header.push("raw_text");
        record.push(raw);
    }

    wtr.write_record(&header)?;
    wtr.write_record(&record)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(view: &ReceiptView<'_>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Vendor:   {}\n", view.vendor));
    output.push_str(&format!("Date:     {}\n", view.date));
    output.push_str(&format!("Amount:   {}\n", view.amount));
    output.push_str(&format!("Currency: {}\n", view.currency));

    if let Some(raw) = view.raw_text {
        output.push_str("\nRaw text:\n");
        output.push_str(raw);
        if !raw.ends_with('\n') {
            output.push('\n');
        }
    }

    output
}

/// Format an amount with two decimals and its currency code.
pub fn money(amount: Decimal, currency: Currency) -> String {
    format!("{} {:.2}", currency, amount)
}
