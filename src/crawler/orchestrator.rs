//! Crawl orchestration - the fetch/extract loop over a page range
//!
//! Pages are processed strictly one after another. A page that fails to
//! fetch, or a fragment that is not a product, contributes nothing and the
//! loop moves on; only the accumulated records carry between pages.

use crate::crawler::fetcher::PageFetcher;
use crate::extract::{FieldExtractor, ProductRecord};
use serde::Serialize;

/// Counters describing what a crawl saw and discarded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub pages_attempted: usize,
    /// Pages skipped because of an HTTP or network failure
    pub pages_failed: usize,
    /// Pages fetched successfully that yielded no records
    pub pages_empty: usize,
    pub fragments_seen: usize,
    /// Fragments rejected by the extractor
    pub fragments_dropped: usize,
}

/// Records in page order, then document order within a page
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    pub records: Vec<ProductRecord>,
    pub stats: CrawlStats,
}

impl CrawlResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }
}

/// Drives fetch -> extract across a page range
pub struct CrawlOrchestrator<F, E> {
    fetcher: F,
    extractor: E,
}

impl<F: PageFetcher, E: FieldExtractor> CrawlOrchestrator<F, E> {
    pub fn new(fetcher: F, extractor: E) -> Self {
        Self { fetcher, extractor }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Crawls every page in `pages` and returns everything collected
    pub async fn crawl<I>(&self, pages: I) -> CrawlResult
    where
        I: IntoIterator<Item = u32>,
    {
        let mut result = CrawlResult::default();
        let start_time = std::time::Instant::now();

        for page in pages {
            result.stats.pages_attempted += 1;

            let outcome = self.fetcher.fetch(page).await;
            if outcome.is_failure() {
                result.stats.pages_failed += 1;
                tracing::info!("Page {} skipped", page);
                continue;
            }

            let added = self.extract_page(page, &outcome.into_fragments(), &mut result);
            if added == 0 {
                result.stats.pages_empty += 1;
            }
        }

        tracing::info!(
            "Crawl finished: {} records from {} pages ({} failed, {} fragments dropped) in {:?}",
            result.records.len(),
            result.stats.pages_attempted,
            result.stats.pages_failed,
            result.stats.fragments_dropped,
            start_time.elapsed()
        );

        result
    }

    /// Extracts one page's fragments into `result`, returning the number kept
    fn extract_page(
        &self,
        page: u32,
        fragments: &[crate::extract::RawFragment],
        result: &mut CrawlResult,
    ) -> usize {
        let before = result.records.len();

        for fragment in fragments {
            result.stats.fragments_seen += 1;
            match self.extractor.extract(fragment) {
                Some(record) => result.records.push(record),
                None => result.stats.fragments_dropped += 1,
            }
        }

        let added = result.records.len() - before;
        tracing::info!(
            "Page {}: {} records from {} fragments",
            page,
            added,
            fragments.len()
        );
        added
    }
}
