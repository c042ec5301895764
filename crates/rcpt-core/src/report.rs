//! Filtering, summaries and spending insights over stored receipts.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::receipt::{Currency, StoredReceipt};
use crate::receipt::DATE_FORMAT;

/// Ordering of filtered receipts by amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Keep insertion order.
    #[default]
    None,
    Ascending,
    Descending,
}

/// Receipt filter: minimum amount, vendor substring and sort order.
#[derive(Debug, Clone, Default)]
pub struct ReceiptFilter {
    /// Case-insensitive vendor substring.
    pub vendor: Option<String>,
    /// Receipts below this amount are dropped.
    pub min_amount: Decimal,
    pub sort: SortOrder,
}

impl ReceiptFilter {
    /// Apply the filter, returning the matching receipts.
    pub fn apply(&self, rows: &[StoredReceipt]) -> Vec<StoredReceipt> {
        let needle = self
            .vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_lowercase);

        let mut matched: Vec<StoredReceipt> = rows
            .iter()
            .filter(|r| r.amount >= self.min_amount)
            .filter(|r| match &needle {
                Some(n) => r.vendor.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        match self.sort {
            SortOrder::None => {}
            SortOrder::Ascending => matched.sort_by(|a, b| a.amount.cmp(&b.amount)),
            SortOrder::Descending => matched.sort_by(|a, b| b.amount.cmp(&a.amount)),
        }

        matched
    }
}

/// Totals over a set of receipts.
///
/// Sums saturate at `Decimal::MAX` instead of overflowing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total: Decimal,
    /// `None` when there are no receipts.
    pub average: Option<Decimal>,
    /// `None` when there are no receipts.
    pub median: Option<Decimal>,
    /// Currency of the first receipt, used as the label for all amounts.
    pub currency: Currency,
}

impl Summary {
    pub fn compute(rows: &[StoredReceipt]) -> Self {
        let count = rows.len();
        let total = rows
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.amount));
        let currency = rows.first().map(|r| r.currency).unwrap_or_default();

        let average = match count {
            0 => None,
            n => total.checked_div(Decimal::from(n)),
        };

        let mut amounts: Vec<Decimal> = rows.iter().map(|r| r.amount).collect();
        amounts.sort();
        let median = match count {
            0 => None,
            n if n % 2 == 1 => Some(amounts[n / 2]),
            n => Some(midpoint(amounts[n / 2 - 1], amounts[n / 2])),
        };

        Self {
            count,
            total,
            average,
            median,
            currency,
        }
    }
}

/// Midpoint of two sorted amounts without overflowing near `Decimal::MAX`.
fn midpoint(low: Decimal, high: Decimal) -> Decimal {
    low.saturating_add(high.saturating_sub(low) / Decimal::TWO)
}

/// Vendors ranked by total spend, highest first, at most `n`.
pub fn top_vendors(rows: &[StoredReceipt], n: usize) -> Vec<(String, Decimal)> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for row in rows {
        let total = totals.entry(row.vendor.as_str()).or_default();
        *total = total.saturating_add(row.amount);
    }

    let mut ranked: Vec<(String, Decimal)> = totals
        .into_iter()
        .map(|(vendor, total)| (vendor.to_string(), total))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

/// Spend per `YYYY-MM` month in chronological order.
///
/// Receipts whose date does not parse are left out.
pub fn monthly_totals(rows: &[StoredReceipt]) -> Vec<(String, Decimal)> {
    let mut months: BTreeMap<String, Decimal> = BTreeMap::new();

    for row in rows {
        if let Ok(date) = NaiveDate::parse_from_str(&row.date, DATE_FORMAT) {
            let total = months.entry(date.format("%Y-%m").to_string()).or_default();
            *total = total.saturating_add(row.amount);
        }
    }

    months.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(id: i64, vendor: &str, date: &str, amount: &str) -> StoredReceipt {
        StoredReceipt {
            id,
            vendor: vendor.to_string(),
            date: date.to_string(),
            amount: dec(amount),
            currency: Currency::Inr,
        }
    }

    fn sample() -> Vec<StoredReceipt> {
        vec![
            row(1, "Corner Shop", "05/01/2024", "120"),
            row(2, "Big Bazaar", "17/01/2024", "40"),
            row(3, "corner cafe", "02/02/2024", "300"),
            row(4, "Big Bazaar", "Unknown", "10"),
        ]
    }

    fn ids(rows: &[StoredReceipt]) -> Vec<i64> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_default_filter_keeps_everything_in_order() {
        let rows = sample();
        assert_eq!(ids(&ReceiptFilter::default().apply(&rows)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_vendor_filter_is_case_insensitive() {
        let filter = ReceiptFilter {
            vendor: Some("CORNER".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec![1, 3]);
    }

    #[test]
    fn test_min_amount_and_sort() {
        let filter = ReceiptFilter {
            min_amount: dec("40"),
            sort: SortOrder::Descending,
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec![3, 1, 2]);

        let filter = ReceiptFilter {
            sort: SortOrder::Ascending,
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_summary() {
        let summary = Summary::compute(&sample());

        assert_eq!(summary.count, 4);
        assert_eq!(summary.total, dec("470"));
        assert_eq!(summary.average, Some(dec("117.5")));
        assert_eq!(summary.median, Some(dec("80")));
        assert_eq!(summary.currency, Currency::Inr);
    }

    #[test]
    fn test_summary_odd_count_and_currency_label() {
        let mut rows = sample();
        rows.truncate(3);
        rows[0].currency = Currency::Usd;

        let summary = Summary::compute(&rows);
        assert_eq!(summary.median, Some(dec("120")));
        assert_eq!(summary.currency, Currency::Usd);
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::compute(&[]);

        assert_eq!(summary.count, 0);
        assert_eq!(summary.total, Decimal::ZERO);
        assert_eq!(summary.average, None);
        assert_eq!(summary.median, None);
        assert_eq!(summary.currency, Currency::Inr);
    }

    #[test]
    fn test_summary_saturates_instead_of_overflowing() {
        let huge = "50000000000000000000000000000";
        let rows = vec![
            row(1, "Vault", "01/01/2024", huge),
            row(2, "Vault", "02/01/2024", huge),
        ];

        let summary = Summary::compute(&rows);
        assert_eq!(summary.total, Decimal::MAX);
        assert_eq!(summary.average, Some(Decimal::MAX / Decimal::TWO));
        assert_eq!(summary.median, Some(dec(huge)));

        assert_eq!(top_vendors(&rows, 1), vec![("Vault".to_string(), Decimal::MAX)]);
        assert_eq!(
            monthly_totals(&rows),
            vec![("2024-01".to_string(), Decimal::MAX)]
        );
    }

    #[test]
    fn test_top_vendors() {
        let top = top_vendors(&sample(), 2);
        assert_eq!(
            top,
            vec![
                ("corner cafe".to_string(), dec("300")),
                ("Corner Shop".to_string(), dec("120")),
            ]
        );

        let all = top_vendors(&sample(), 10);
        assert_eq!(all[2], ("Big Bazaar".to_string(), dec("50")));
    }

    #[test]
    fn test_monthly_totals_skip_unparseable_dates() {
        assert_eq!(
            monthly_totals(&sample()),
            vec![
                ("2024-01".to_string(), dec("160")),
                ("2024-02".to_string(), dec("300")),
            ]
        );
    }
}
