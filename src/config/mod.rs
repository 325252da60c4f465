//! Configuration module for Listing-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use listing_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! for page in config.crawler.page_range() {
//!     println!("{}", config.crawler.page_url(page));
//! }
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    build_page_url, Config, CrawlerConfig, HealthConfig, OutputConfig, UserAgentConfig,
    PAGE_PLACEHOLDER,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
