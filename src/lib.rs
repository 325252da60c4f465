//! Listing-Harvest: a paginated product listing scraper
//!
//! This crate walks a fixed, page-numbered e-commerce listing, extracts one
//! structured record per product card, and persists the collected records to
//! interchangeable sinks (CSV file, SQLite store).

pub mod config;
pub mod crawler;
pub mod extract;
pub mod storage;

use thiserror::Error;

/// Main error type for Listing-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Listing-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOrchestrator, CrawlResult, HealthChecker, HealthStatus};
pub use extract::{FieldExtractor, ProductExtractor, ProductRecord, RawFragment};
pub use storage::{CsvFileSink, SqliteSink, StorageSink};
