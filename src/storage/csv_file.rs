//! CSV file sink
//!
//! Writes the whole record set to a temporary sibling file and renames it over
//! the target, so readers see either the previous file or the complete new one.

use crate::extract::ProductRecord;
use crate::storage::traits::{StorageError, StorageResult, StorageSink};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Overwrites a CSV file with one header row plus one row per record
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("products.csv"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_to(&self, target: &Path, records: &[ProductRecord]) -> StorageResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(target)?;

        writer.write_record(ProductRecord::FIELDS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl StorageSink for CsvFileSink {
    fn name(&self) -> &str {
        "csv"
    }

    fn save(&self, records: &[ProductRecord]) -> StorageResult<usize> {
        let temp = self.temp_path();

        let written = self
            .write_to(&temp, records)
            .and_then(|()| fs::rename(&temp, &self.path).map_err(StorageError::from));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            tracing::warn!("Failed to write {}: {}", self.path.display(), e);
            return Err(e);
        }

        if !self.path.exists() {
            return Err(StorageError::MissingOutput(self.path.display().to_string()));
        }

        tracing::info!(
            "Data successfully saved to {} ({} rows)",
            self.path.display(),
            records.len()
        );
        Ok(records.len())
    }
}
