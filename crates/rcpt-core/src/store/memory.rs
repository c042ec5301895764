//! In-memory receipt store.

use std::sync::Mutex;

use super::{ReceiptStore, Result};
use crate::error::StoreError;
use crate::models::receipt::StoredReceipt;
use crate::receipt::ValidatedReceipt;

/// Store keeping receipts in a vector, ids starting at 1.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredReceipt>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReceiptStore for MemoryStore {
    fn insert(&self, receipt: &ValidatedReceipt) -> Result<i64> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::Poisoned)?;
        let id = rows.last().map(|r| r.id + 1).unwrap_or(1);

        rows.push(StoredReceipt {
            id,
            vendor: receipt.vendor().to_string(),
            date: receipt.date().to_string(),
            amount: receipt.amount(),
            currency: receipt.currency(),
        });

        Ok(id)
    }

    fn fetch_all(&self) -> Result<Vec<StoredReceipt>> {
        let rows = self.rows.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::ReceiptDraft;

    fn draft(vendor: &str, amount: &str) -> ValidatedReceipt {
        ReceiptDraft {
            vendor: vendor.to_string(),
            date: "01/06/2024".to_string(),
            amount: amount.to_string(),
            currency: "INR".to_string(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_insert_and_fetch() {
        let store = MemoryStore::new();
        assert_eq!(store.insert(&draft("A", "1")).unwrap(), 1);
        assert_eq!(store.insert(&draft("B", "2")).unwrap(), 2);

        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].vendor, "A");
        assert_eq!(rows[1].id, 2);
    }

    #[test]
    fn test_empty_store() {
        assert!(MemoryStore::new().fetch_all().unwrap().is_empty());
    }
}
