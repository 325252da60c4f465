//! Listing page fetcher
//!
//! This module handles the HTTP side of a crawl:
//! - Building the HTTP client with the configured user agent
//! - One GET per listing page, with no retry at this layer
//! - Classifying non-200 and transport failures so the page can be skipped
//! - Splitting a successful page into product-card fragments

use crate::config::{build_page_url, UserAgentConfig};
use crate::extract::{ExtractError, RawFragment};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;

/// Product cards on a listing page
pub const PRODUCT_CARD_SELECTOR: &str = r#"div[data-testid="info-with-rrp"]"#;

/// Result of fetching one listing page
#[derive(Debug)]
pub enum FetchOutcome {
    /// Page fetched; product-card fragments in document order
    Fragments(Vec<RawFragment>),

    /// Server answered with something other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, unreadable body)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// True when the page could not be retrieved
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Fragments(_))
    }

    /// The page's fragments; failed pages contribute none
    pub fn into_fragments(self) -> Vec<RawFragment> {
        match self {
            Self::Fragments(fragments) => fragments,
            _ => Vec::new(),
        }
    }
}

/// Source of listing pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page by index. Failures are reported in the outcome, never raised.
    async fn fetch(&self, page: u32) -> FetchOutcome;
}

/// Builds an HTTP client that identifies itself with the configured user agent
///
/// # Example
///
/// ```no_run
/// use listing_harvest::config::UserAgentConfig;
/// use listing_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     value: "Mozilla/5.0 (X11; Linux x86_64)".to_string(),
///     request_timeout_secs: 30,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.value.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages over HTTP from a `{page}` URL template
pub struct HttpPageFetcher {
    client: Client,
    url_template: String,
    card_selector: Selector,
}

impl HttpPageFetcher {
    pub fn new(client: Client, url_template: impl Into<String>) -> Result<Self, ExtractError> {
        Ok(Self {
            client,
            url_template: url_template.into(),
            card_selector: crate::extract::compile_selector(PRODUCT_CARD_SELECTOR)?,
        })
    }

    /// URL requested for the given page
    pub fn page_url(&self, page: u32) -> String {
        build_page_url(&self.url_template, page)
    }

    /// Splits a listing document into product-card fragments, in document order
    pub fn split_cards(&self, body: &str) -> Vec<RawFragment> {
        let document = Html::parse_document(body);
        document
            .select(&self.card_selector)
            .map(|card| RawFragment::new(card.html()))
            .collect()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, page: u32) -> FetchOutcome {
        let url = self.page_url(page);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = describe_transport_error(&e);
                tracing::warn!("Failed to retrieve page {} ({}): {}", page, url, error);
                return FetchOutcome::NetworkError { error };
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(
                "Failed to retrieve data for page {}. Status code: {}",
                page,
                status.as_u16()
            );
            return FetchOutcome::HttpError {
                status_code: status.as_u16(),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read body of page {}: {}", page, e);
                return FetchOutcome::NetworkError {
                    error: e.to_string(),
                };
            }
        };

        let fragments = self.split_cards(&body);
        tracing::info!(
            "Request successful for page {} ({} product cards)",
            page,
            fragments.len()
        );
        FetchOutcome::Fragments(fragments)
    }
}

/// Short description of a transport failure
pub(crate) fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Request timeout: {}", e)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
