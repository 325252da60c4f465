//! Storage traits and error types
//!
//! This module defines the sink interface shared by the CSV and SQLite
//! backends and the errors they surface.

use crate::extract::ProductRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Output file missing after write: {0}")]
    MissingOutput(String),

    #[error("Product not found: {0}")]
    NotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A persistence target for crawled records
///
/// Each `save` call is self-contained: it acquires and releases its own
/// resources, and either persists every record or reports an error.
/// Sinks are independent of each other.
pub trait StorageSink {
    /// Short name used in logs and CLI output
    fn name(&self) -> &str;

    /// Persists `records`, returning how many were written
    fn save(&self, records: &[ProductRecord]) -> StorageResult<usize>;
}
