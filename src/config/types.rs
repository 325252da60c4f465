use serde::Deserialize;

/// Placeholder substituted with the page index in the listing URL template
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Substitutes every `{page}` in a listing template with the page index
pub fn build_page_url(template: &str, page: u32) -> String {
    template.replace(PAGE_PLACEHOLDER, &page.to_string())
}

/// Main configuration structure for Listing-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub health: HealthConfig,
    pub output: OutputConfig,
}

/// Listing pagination configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing URL with a `{page}` placeholder
    #[serde(rename = "url-template")]
    pub url_template: String,

    /// First page index to fetch
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Last page index (exclusive unless `end_inclusive` is set)
    #[serde(rename = "end-page")]
    pub end_page: u32,

    #[serde(rename = "end-inclusive", default)]
    pub end_inclusive: bool,

    /// Prefix the product name with the brand label
    #[serde(rename = "merge-brand-into-name", default = "default_true")]
    pub merge_brand_into_name: bool,
}

impl CrawlerConfig {
    /// Page indices to crawl, in ascending order
    pub fn page_range(&self) -> impl Iterator<Item = u32> {
        let last = if self.end_inclusive {
            Some(self.end_page)
        } else {
            self.end_page.checked_sub(1)
        };
        match last {
            Some(last) => self.start_page..=last,
            // exclusive end of 0
            None => 1..=0,
        }
    }

    /// Builds the listing URL for one page
    pub fn page_url(&self, page: u32) -> String {
        build_page_url(&self.url_template, page)
    }
}

/// Outbound request identification
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Value sent as the User-Agent header
    pub value: String,

    /// Timeout applied to every listing request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Health probe configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(rename = "timeout-secs", default = "default_health_timeout")]
    pub timeout_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_secs: default_health_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV file written by the file sink
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_health_timeout() -> u64 {
    5
}
