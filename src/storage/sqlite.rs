//! SQLite storage implementation
//!
//! Every operation opens its own connection and drops it before returning,
//! so no connection outlives a call and concurrent sinks never share one.

use crate::extract::ProductRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, StorageSink};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use serde::Serialize;
use std::path::{Path, PathBuf};

const INSERT_PRODUCT: &str = "INSERT INTO products
    (name, brand, price, cart_count, favorite_count, rating_score, rating_count, promotions)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const SELECT_PRODUCT: &str = "SELECT id, name, brand, price, cart_count, favorite_count,
    rating_score, rating_count, promotions FROM products";

/// A persisted product with its assigned identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredProduct {
    pub id: i64,
    #[serde(flatten)]
    pub record: ProductRecord,
}

/// Transactional SQLite sink
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a fresh connection with the schema in place
    fn connect(&self) -> StorageResult<Connection> {
        let conn = Connection::open(&self.path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(conn)
    }

    /// Inserts a single record, returning its id
    pub fn insert_product(&self, record: &ProductRecord) -> StorageResult<i64> {
        let conn = self.connect()?;
        insert_record(&conn, record)?;
        Ok(conn.last_insert_rowid())
    }

    /// Gets a stored product by id
    pub fn get_product(&self, id: i64) -> StorageResult<Option<StoredProduct>> {
        let conn = self.connect()?;
        let product = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_PRODUCT),
                params![id],
                stored_from_row,
            )
            .optional()?;
        Ok(product)
    }

    /// Deletes a product, returning the removed row
    pub fn delete_product(&self, id: i64) -> StorageResult<StoredProduct> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let product = tx
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_PRODUCT),
                params![id],
                stored_from_row,
            )
            .optional()?
            .ok_or(StorageError::NotFound(id))?;

        tx.execute("DELETE FROM products WHERE id = ?1", params![id])?;
        tx.commit()?;

        tracing::debug!("Deleted product {}", id);
        Ok(product)
    }

    /// Lists all stored products in id order
    pub fn list_products(&self) -> StorageResult<Vec<StoredProduct>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_PRODUCT))?;

        let products = stmt
            .query_map([], stored_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// Counts stored products
    pub fn count_products(&self) -> StorageResult<u64> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl StorageSink for SqliteSink {
    fn name(&self) -> &str {
        "sqlite"
    }

    /// Inserts all records in one transaction; any failure rolls back every row
    fn save(&self, records: &[ProductRecord]) -> StorageResult<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        match insert_all(&tx, records) {
            Ok(count) => {
                tx.commit()?;
                tracing::info!("Saved {} products to {}", count, self.path.display());
                Ok(count)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback() {
                    tracing::error!("Rollback failed: {}", rollback_error);
                }
                tracing::warn!(
                    "Saving to {} failed, nothing was persisted: {}",
                    self.path.display(),
                    e
                );
                Err(e)
            }
        }
    }
}

fn insert_all(tx: &Transaction<'_>, records: &[ProductRecord]) -> StorageResult<usize> {
    let mut stmt = tx.prepare(INSERT_PRODUCT)?;
    for (index, record) in records.iter().enumerate() {
        stmt.execute(record_params(record)).map_err(|e| {
            tracing::debug!("Insert of record {} ({}) failed: {}", index, record.name, e);
            e
        })?;
    }
    Ok(records.len())
}

fn insert_record(conn: &Connection, record: &ProductRecord) -> StorageResult<()> {
    conn.execute(INSERT_PRODUCT, record_params(record))?;
    Ok(())
}

fn record_params(record: &ProductRecord) -> [&str; 8] {
    [
        &record.name,
        &record.brand,
        &record.price,
        &record.cart_count,
        &record.favorite_count,
        &record.rating_score,
        &record.rating_count,
        &record.promotions,
    ]
}

fn stored_from_row(row: &Row<'_>) -> rusqlite::Result<StoredProduct> {
    Ok(StoredProduct {
        id: row.get(0)?,
        record: ProductRecord {
            name: row.get(1)?,
            brand: row.get(2)?,
            price: row.get(3)?,
            cart_count: row.get(4)?,
            favorite_count: row.get(5)?,
            rating_score: row.get(6)?,
            rating_count: row.get(7)?,
            promotions: row.get(8)?,
        },
    })
}
