//! Crawler module for listing retrieval and orchestration
//!
//! This module contains the crawling side of the pipeline:
//! - HTTP fetching of listing pages (no retry, failed pages are skipped)
//! - A standalone health probe with bounded retries
//! - The page-by-page fetch/extract loop

mod fetcher;
mod health;
mod orchestrator;

pub use fetcher::{
    build_http_client, FetchOutcome, HttpPageFetcher, PageFetcher, PRODUCT_CARD_SELECTOR,
};
pub use health::{Health, HealthChecker, HealthStatus, DEFAULT_MAX_RETRIES, RETRY_PAUSE};
pub use orchestrator::{CrawlOrchestrator, CrawlResult, CrawlStats};

use crate::config::{validate, Config};
use crate::extract::{ExtractorOptions, ProductExtractor};

/// The HTTP-backed orchestrator used by the CLI
pub type ListingCrawler = CrawlOrchestrator<HttpPageFetcher, ProductExtractor>;

/// Wires an HTTP fetcher and the product extractor from configuration
///
/// The configuration is validated first, since it may have been built in code
/// rather than loaded from a file.
pub fn build_crawler(config: &Config) -> crate::Result<ListingCrawler> {
    validate(config)?;
    let client = build_http_client(&config.user_agent)?;
    let fetcher = HttpPageFetcher::new(client, config.crawler.url_template.clone())?;
    let extractor = ProductExtractor::new(ExtractorOptions {
        merge_brand_into_name: config.crawler.merge_brand_into_name,
    })?;
    Ok(CrawlOrchestrator::new(fetcher, extractor))
}

/// Runs a complete crawl over the configured page range
///
/// # Returns
///
/// * `Ok(CrawlResult)` - All records collected, in page then document order
/// * `Err(HarvestError)` - The configuration is invalid, or the HTTP client or
///   selectors could not be built
pub async fn crawl(config: &Config) -> crate::Result<CrawlResult> {
    let crawler = build_crawler(config)?;
    Ok(crawler.crawl(config.crawler.page_range()).await)
}
