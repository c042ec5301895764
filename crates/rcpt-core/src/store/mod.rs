//! Receipt persistence.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::models::receipt::StoredReceipt;
use crate::receipt::ValidatedReceipt;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Trait for receipt stores.
///
/// Only validated receipts can be inserted.
pub trait ReceiptStore: Send + Sync {
    /// Insert a receipt, returning its new id.
    fn insert(&self, receipt: &ValidatedReceipt) -> Result<i64>;

    /// All stored receipts in insertion (id) order.
    fn fetch_all(&self) -> Result<Vec<StoredReceipt>>;
}
