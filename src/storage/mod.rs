//! Storage module for persisting crawled products
//!
//! This module provides the interchangeable sinks a crawl result can be
//! handed to:
//! - A CSV file sink with whole-file overwrite semantics
//! - A transactional SQLite sink (all-or-nothing per save), which also
//!   offers record management on the stored rows

mod csv_file;
mod schema;
mod sqlite;
mod traits;

pub use csv_file::CsvFileSink;
pub use schema::initialize_schema;
pub use sqlite::{SqliteSink, StoredProduct};
pub use traits::{StorageError, StorageResult, StorageSink};

use crate::extract::ProductRecord;

/// Outcome of one sink within [`save_to_sinks`]
#[derive(Debug)]
pub struct SinkReport {
    pub sink: String,
    pub result: StorageResult<usize>,
}

/// Saves the same records to every sink, independently
///
/// A failing sink is reported and the remaining sinks still run.
pub fn save_to_sinks(records: &[ProductRecord], sinks: &[&dyn StorageSink]) -> Vec<SinkReport> {
    sinks
        .iter()
        .map(|sink| {
            let result = sink.save(records);
            if let Err(e) = &result {
                tracing::error!("Sink '{}' failed: {}", sink.name(), e);
            }
            SinkReport {
                sink: sink.name().to_string(),
                result,
            }
        })
        .collect()
}
