//! SQLite receipt store using rusqlite.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use rusqlite::types::Value;
use rusqlite::{params, Connection};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{ReceiptStore, Result};
use crate::error::StoreError;
use crate::models::receipt::{Currency, StoredReceipt, UNKNOWN};
use crate::receipt::ValidatedReceipt;

/// Receipt store backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!("Opened receipt database {}", path.display());
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Create the receipts table and add columns missing from older databases.
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS receipts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            vendor TEXT,
            date TEXT,
            amount REAL,
            currency TEXT
        );
        "#,
    )?;

    if !has_column(conn, "receipts", "currency")? {
        info!("Migrating receipts table: adding currency column");
        conn.execute_batch(
            "ALTER TABLE receipts ADD COLUMN currency TEXT NOT NULL DEFAULT 'INR'",
        )?;
    }

    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|name| name == column))
}

impl ReceiptStore for SqliteStore {
    fn insert(&self, receipt: &ValidatedReceipt) -> Result<i64> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        conn.execute(
            "INSERT INTO receipts (vendor, date, amount, currency) VALUES (?1, ?2, ?3, ?4)",
            params![
                receipt.vendor(),
                receipt.date(),
                receipt.amount().to_f64().unwrap_or_default(),
                receipt.currency().code(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Inserted receipt {} from {}", id, receipt.vendor());
        Ok(id)
    }

    fn fetch_all(&self) -> Result<Vec<StoredReceipt>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        let mut stmt =
            conn.prepare("SELECT id, vendor, date, amount, currency FROM receipts ORDER BY id")?;

        let raw_rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Value>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        raw_rows
            .into_iter()
            .map(|(id, vendor, date, amount, currency)| {
                Ok(StoredReceipt {
                    id,
                    vendor: vendor.unwrap_or_else(|| UNKNOWN.to_string()),
                    date: date.unwrap_or_else(|| UNKNOWN.to_string()),
                    amount: decode_amount(id, amount)?,
                    currency: decode_currency(id, currency)?,
                })
            })
            .collect()
    }
}

fn decode_amount(id: i64, value: Value) -> Result<Decimal> {
    let amount = match value {
        Value::Real(f) => Decimal::from_f64(f),
        Value::Integer(i) => Some(Decimal::from(i)),
        Value::Text(s) => Decimal::from_str(s.trim()).ok(),
        Value::Null | Value::Blob(_) => None,
    };

    amount.ok_or_else(|| StoreError::CorruptRow {
        id,
        reason: "amount is not a number".to_string(),
    })
}

fn decode_currency(id: i64, value: Option<String>) -> Result<Currency> {
    match value {
        None => Ok(Currency::default()),
        Some(code) => Currency::from_str(&code).map_err(|reason| StoreError::CorruptRow { id, reason }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::ReceiptDraft;
    use pretty_assertions::assert_eq;

    fn validated(vendor: &str, date: &str, amount: &str, currency: &str) -> ValidatedReceipt {
        ReceiptDraft {
            vendor: vendor.to_string(),
            date: date.to_string(),
            amount: amount.to_string(),
            currency: currency.to_string(),
        }
        .validate()
        .unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();

        let first = store
            .insert(&validated("Corner Shop", "05/03/2024", "1234.50", "INR"))
            .unwrap();
        let second = store
            .insert(&validated("Diner", "06/03/2024", "12.99", "USD"))
            .unwrap();
        assert!(second > first);

        let rows = store.fetch_all().unwrap();
        assert_eq!(
            rows,
            vec![
                StoredReceipt {
                    id: first,
                    vendor: "Corner Shop".to_string(),
                    date: "05/03/2024".to_string(),
                    amount: dec("1234.5"),
                    currency: Currency::Inr,
                },
                StoredReceipt {
                    id: second,
                    vendor: "Diner".to_string(),
                    date: "06/03/2024".to_string(),
                    amount: dec("12.99"),
                    currency: Currency::Usd,
                },
            ]
        );
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipts.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert(&validated("Acme", "01/01/2024", "10", "INR"))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec("10"));
    }

    #[test]
    fn test_legacy_table_is_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE receipts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    vendor TEXT,
                    date TEXT,
                    amount REAL
                );
                INSERT INTO receipts (vendor, date, amount) VALUES ('Old Shop', '01/01/2023', 42.5);",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vendor, "Old Shop");
        assert_eq!(rows[0].amount, dec("42.5"));
        assert_eq!(rows[0].currency, Currency::Inr);

        store
            .insert(&validated("New Shop", "02/01/2023", "1", "USD"))
            .unwrap();
        assert_eq!(store.fetch_all().unwrap()[1].currency, Currency::Usd);
    }

    #[test]
    fn test_unknown_currency_is_corrupt_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO receipts (vendor, date, amount, currency) VALUES ('X', '01/01/2024', 1.0, 'EUR')",
                [],
            )
            .unwrap();

        let err = store.fetch_all().unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { .. }));
    }

    #[test]
    fn test_largest_valid_amounts_read_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let max = crate::receipt::MAX_AMOUNT.to_string();
        store
            .insert(&validated("Vault", "01/01/2024", &max, "INR"))
            .unwrap();
        store
            .insert(&validated("Vault", "02/01/2024", &max, "INR"))
            .unwrap();

        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, crate::receipt::MAX_AMOUNT);

        let summary = crate::report::Summary::compute(&rows);
        assert_eq!(summary.total, dec("2000000000000"));
    }

    #[test]
    fn test_decode_amount_variants() {
        assert_eq!(decode_amount(1, Value::Integer(7)).unwrap(), dec("7"));
        assert_eq!(decode_amount(1, Value::Text(" 3.25 ".to_string())).unwrap(), dec("3.25"));
        assert!(decode_amount(1, Value::Null).is_err());
    }
}
