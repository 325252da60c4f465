//! Product extraction from listing markup
//!
//! This module turns one product-card subtree into a normalized
//! [`ProductRecord`]. It handles:
//! - Rejecting fragments that are not product cards (ads, layout fillers)
//! - Null-tolerant lookup of every optional field, defaulting to [`NOT_AVAILABLE`]
//! - Normalization of rating, review-count and promotion values

mod normalize;
mod product;

pub use normalize::{join_promotions, normalize_rating_count, normalize_rating_score};
pub use product::{ExtractorOptions, ProductExtractor};

pub(crate) use product::compile as compile_selector;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel stored for a field that was looked up but could not be resolved
pub const NOT_AVAILABLE: &str = "N/A";

/// Errors raised while walking a single fragment
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing mandatory element: {0}")]
    MissingField(&'static str),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Malformed fragment: {0}")]
    Malformed(String),
}

/// Markup of one product card, owned so it can outlive the page document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    html: String,
}

impl RawFragment {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// One product scraped from the listing
///
/// Every field is always populated; unresolved values hold [`NOT_AVAILABLE`].
/// Field order is the column order used by the file and database sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub brand: String,
    pub price: String,
    pub cart_count: String,
    pub favorite_count: String,
    pub rating_score: String,
    pub rating_count: String,
    pub promotions: String,
}

impl ProductRecord {
    /// Column names, in serialization order
    pub const FIELDS: [&'static str; 8] = [
        "name",
        "brand",
        "price",
        "cart_count",
        "favorite_count",
        "rating_score",
        "rating_count",
        "promotions",
    ];

    /// A record with the given name and every other field set to the sentinel
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brand: NOT_AVAILABLE.to_string(),
            price: NOT_AVAILABLE.to_string(),
            cart_count: NOT_AVAILABLE.to_string(),
            favorite_count: NOT_AVAILABLE.to_string(),
            rating_score: NOT_AVAILABLE.to_string(),
            rating_count: NOT_AVAILABLE.to_string(),
            promotions: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Turns one fragment into a record, or `None` when the fragment is not a product
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, fragment: &RawFragment) -> Option<ProductRecord>;
}
