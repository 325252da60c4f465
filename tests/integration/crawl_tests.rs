//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing pages and test the
//! fetch -> extract cycle and the health probe end-to-end.

use listing_harvest::config::{
    Config, CrawlerConfig, HealthConfig, OutputConfig, UserAgentConfig,
};
use listing_harvest::crawler::{
    build_crawler, build_http_client, crawl, FetchOutcome, Health, HealthChecker,
    HttpPageFetcher, PageFetcher,
};
use listing_harvest::extract::NOT_AVAILABLE;
use listing_harvest::{ConfigError, HarvestError};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) ListingHarvestTest/1.0";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, start_page: u32, end_page: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            url_template: format!("{}/sr?wg=2&pi={{page}}", base_url),
            start_page,
            end_page,
            end_inclusive: false,
            merge_brand_into_name: true,
        },
        user_agent: UserAgentConfig {
            value: USER_AGENT.to_string(),
            request_timeout_secs: 5,
        },
        health: HealthConfig::default(),
        output: OutputConfig {
            csv_path: "./unused.csv".to_string(),
            database_path: "./unused.db".to_string(),
        },
    }
}

fn card(brand: &str, name: &str, price: Option<&str>) -> String {
    let price = price
        .map(|p| format!(r#"<p class="selling-price">{}</p>"#, p))
        .unwrap_or_default();
    format!(
        r#"<div data-testid="info-with-rrp">
            <span data-testid="product-brand">{brand}</span>
            <span data-testid="product-name-text">{name}</span>
            {price}
            <div data-testid="social-proof-content-basketCount"><span>1.2K</span></div>
            <div data-testid="social-proof-content-favoriteCount"><span>310</span></div>
            <div class="p-rating-full" style="width:90%"></div>
            <span class="p-total-rating-count">(48)</span>
            <div class="promotion"><span class="promotion-name">Free Shipping</span></div>
        </div>"#
    )
}

fn listing(cards: &[String]) -> String {
    format!(
        "<html><head><title>Listing</title></head><body><div class=\"grid\">{}</div></body></html>",
        cards.join("\n")
    )
}

async fn mount_page(server: &MockServer, page: u32, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path("/sr"))
        .and(query_param("pi", page.to_string().as_str()))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_fragments_one_missing_price() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        1,
        200,
        listing(&[
            card("Acme", "Trail Runner", Some("1.299 TL")),
            card("Zeta", "Rain Jacket", None),
        ]),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), 1, 2);
    let result = crawl(&config).await.expect("Crawl failed");

    assert_eq!(result.len(), 2);

    let first = &result.records[0];
    assert_eq!(first.name, "Acme Trail Runner");
    assert_eq!(first.price, "1.299 TL");

    let second = &result.records[1];
    assert_eq!(second.name, "Zeta Rain Jacket");
    assert_eq!(second.brand, "Zeta");
    assert_eq!(second.price, NOT_AVAILABLE);
    assert_eq!(second.cart_count, "1.2K");
    assert_eq!(second.favorite_count, "310");
    assert_eq!(second.rating_score, "90%");
    assert_eq!(second.rating_count, "48");
    assert_eq!(second.promotions, "Free Shipping");
}

#[tokio::test]
async fn test_failed_page_is_skipped() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 2, 200, listing(&[card("A", "one", Some("1"))])).await;
    mount_page(&mock_server, 3, 503, "unavailable".to_string()).await;
    mount_page(
        &mock_server,
        4,
        200,
        listing(&[card("B", "two", Some("2")), card("C", "three", Some("3"))]),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), 2, 5);
    let result = crawl(&config).await.expect("Crawl failed");

    let names: Vec<&str> = result.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["A one", "B two", "C three"]);
    assert_eq!(result.stats.pages_attempted, 3);
    assert_eq!(result.stats.pages_failed, 1);
}

#[tokio::test]
async fn test_non_product_cards_are_dropped() {
    let mock_server = MockServer::start().await;
    let ad_slot = r#"<div data-testid="info-with-rrp"><span class="ad">Sponsored</span></div>"#;
    let no_name = r#"<div data-testid="info-with-rrp"><span data-testid="product-brand">Acme</span></div>"#;
    mount_page(
        &mock_server,
        1,
        200,
        listing(&[
            ad_slot.to_string(),
            card("Acme", "Runner", Some("5")),
            no_name.to_string(),
        ]),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), 1, 2);
    let crawler = build_crawler(&config).unwrap();
    let result = crawler.crawl(config.crawler.page_range()).await;

    assert_eq!(result.len(), 1);
    assert_eq!(result.stats.fragments_seen, 3);
    assert_eq!(result.stats.fragments_dropped, 2);
}

#[tokio::test]
async fn test_blank_name_card_is_kept() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        1,
        200,
        listing(&[card("Acme", "", Some("10 TL")), card("Zeta", "Runner", None)]),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), 1, 2);
    let result = crawl(&config).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.stats.fragments_dropped, 0);
    assert_eq!(result.records[0].name, "Acme ");
    assert_eq!(result.records[0].price, "10 TL");
}

#[test]
fn test_invalid_config_is_rejected_before_crawling() {
    let mut config = create_test_config("http://127.0.0.1:9", 1, 2);
    config.crawler.url_template = "http://127.0.0.1:9/sr?wg=2".to_string();

    assert!(matches!(
        build_crawler(&config),
        Err(HarvestError::Config(ConfigError::Validation(_)))
    ));
}

#[tokio::test]
async fn test_duplicate_pages_are_not_deduplicated() {
    let mock_server = MockServer::start().await;
    let body = listing(&[card("Acme", "Runner", Some("5"))]);
    mount_page(&mock_server, 1, 200, body.clone()).await;
    mount_page(&mock_server, 2, 200, body).await;

    let config = create_test_config(&mock_server.uri(), 1, 3);
    let result = crawl(&config).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.records[0], result.records[1]);
}

#[tokio::test]
async fn test_user_agent_header_is_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sr"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, 2);
    let result = crawl(&config).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.stats.pages_empty, 1);
}

#[tokio::test]
async fn test_page_fetch_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, 2);
    let client = build_http_client(&config.user_agent).unwrap();
    let fetcher = HttpPageFetcher::new(client, config.crawler.url_template.clone()).unwrap();

    let outcome = fetcher.fetch(1).await;
    assert!(matches!(outcome, FetchOutcome::HttpError { status_code: 500 }));
}

#[tokio::test]
async fn test_network_error_yields_no_fragments() {
    let config = create_test_config("http://127.0.0.1:9", 1, 2);
    let client = build_http_client(&config.user_agent).unwrap();
    let fetcher = HttpPageFetcher::new(client, config.crawler.url_template.clone()).unwrap();

    let outcome = fetcher.fetch(1).await;
    assert!(matches!(outcome, FetchOutcome::NetworkError { .. }));
    assert!(outcome.into_fragments().is_empty());
}

#[tokio::test]
async fn test_health_single_attempt_on_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let checker = HealthChecker::new(reqwest::Client::new());
    let status = checker
        .check(
            &format!("{}/health", mock_server.uri()),
            3,
            Duration::from_secs(2),
        )
        .await;

    assert_eq!(status.status, Health::Healthy);
    assert_eq!(status.status_code, Some(200));
    assert_eq!(status.attempts, 1);
    assert!(status.error.is_none());
    assert!(status.response_time.is_some());
}

#[tokio::test]
async fn test_health_timeouts_exhaust_retries_with_pauses() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let checker = HealthChecker::new(reqwest::Client::new());
    let started = Instant::now();
    let status = checker
        .check(&mock_server.uri(), 3, Duration::from_millis(300))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(status.status, Health::Unhealthy);
    assert_eq!(status.attempts, 3);
    assert!(status.status_code.is_none());
    assert!(status.error.is_some());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    // Two one-second pauses separate the three attempts
    assert!(
        elapsed >= Duration::from_secs(2),
        "expected at least 2s, got {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_health_non_200_reports_last_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let checker = HealthChecker::new(reqwest::Client::new());
    let status = checker
        .check(&mock_server.uri(), 2, Duration::from_secs(2))
        .await;

    assert_eq!(status.status, Health::Unhealthy);
    assert_eq!(status.status_code, Some(503));
    assert_eq!(status.attempts, 2);
    assert_eq!(status.error.as_deref(), Some("unexpected status 503"));
}
