//! End-to-end crawls against a mock storefront
//!
//! These tests use wiremock to serve listing and detail pages and run the
//! full pipeline over real HTTP.

use product_harvester::config::HarvestConfig;
use product_harvester::Harvester;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "HarvesterTest/1.0";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> HarvestConfig {
    let mut config = HarvestConfig::default();
    config.site.base_url = base_url.to_string();
    config.headers.user_agent = USER_AGENT.to_string();
    config.fetch.retry_delay_ms = 0;
    config.fetch.timeout_secs = 5;
    config.crawler.page_delay_ms = 0;
    config
}

fn listing_page(asins: &[&str], next: Option<&str>) -> String {
    let mut body = String::from("<html><body>");
    for asin in asins {
        body.push_str(&format!(
            r#"<div role="listitem" data-asin="{asin}">
                 <a class="a-link-normal" href="/Product-{asin}/dp/{asin}?ref=sr_pg_1&qid=17">{asin}</a>
               </div>"#
        ));
    }
    if let Some(href) = next {
        body.push_str(&format!(
            r#"<a class="s-pagination-item s-pagination-next" href="{href}">Next</a>"#
        ));
    }
    body.push_str("</body></html>");
    body
}

fn detail_page(title: &str, ratings: &str, reviews: usize) -> String {
    let mut body = format!(
        r#"<html><body>
           <span id="productTitle">{title}</span>
           <span id="acrPopover" title="4.6 out of 5 stars"></span>
           <span id="acrCustomerReviewText">{ratings} ratings</span>
           <span class="a-price"><span class="a-offscreen">S$19.90</span></span>
           <img id="landingImage" src="https://img.example/{title}.jpg">"#
    );
    for i in 0..reviews {
        body.push_str(&format!(
            r#"<div class="review"><span class="a-profile-name">Reviewer {i}</span>
               <span class="review-text">Review body {i}</span></div>"#
        ));
    }
    body.push_str("</body></html>");
    body
}

async fn mount_detail(server: &MockServer, asin: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/Product-{asin}/dp/{asin}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_follows_pagination() {
    let mock_server = MockServer::start().await;

    // Page 1: three products and a next link, requested with the identifying headers
    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("k", "desk lamp"))
        .and(query_param("page", "1"))
        .and(header("user-agent", USER_AGENT))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &["A1", "A2", "FAIL"],
            Some("/s?k=desk+lamp&page=2"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Page 2: one new product plus a repeat of A1, no next link
    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_page(&["A4", "A1"], None)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_detail(&mock_server, "A1", detail_page("Lamp-One", "1,234", 2)).await;
    mount_detail(&mock_server, "A2", detail_page("Lamp-Two", "87", 0)).await;
    mount_detail(&mock_server, "A4", detail_page("Lamp-Four", "5", 1)).await;

    // A product page that never recovers is retried exactly three times
    Mock::given(method("GET"))
        .and(path("/Product-FAIL/dp/FAIL"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let harvester = Harvester::new(config).expect("Failed to create harvester");

    let mut progress = Vec::new();
    let result = harvester
        .crawl("desk lamp", 5, |p| progress.push(p))
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages_walked, 2);
    assert_eq!(result.urls_discovered, 4, "A1 should be deduplicated");
    assert_eq!(result.len(), 3);

    // One progress report per settled detail fetch, ending at exactly 1.0
    assert_eq!(progress.len(), 4);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert!(progress.iter().all(|p| (0.0..=1.0).contains(p)));
    assert_eq!(*progress.last().unwrap(), 1.0);

    let lamp_one = result
        .records
        .iter()
        .find(|r| r.title.as_deref() == Some("Lamp-One"))
        .expect("Lamp-One missing");
    assert_eq!(lamp_one.num_ratings, 1234);
    assert_eq!(lamp_one.rating_text.as_deref(), Some("4.6"));
    assert_eq!(lamp_one.price_text.as_deref(), Some("S$19.90"));
    assert_eq!(lamp_one.reviews.len(), 2);
    assert_eq!(
        lamp_one.source_url,
        format!("{}/Product-A1/dp/A1", mock_server.uri())
    );

    let lamp_two = result
        .records
        .iter()
        .find(|r| r.title.as_deref() == Some("Lamp-Two"))
        .expect("Lamp-Two missing");
    assert!(lamp_two.reviews.is_empty());
}

#[tokio::test]
async fn test_max_pages_stops_before_next_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &["A1"],
            Some("/s?k=lamp&page=2"),
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["A2"], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    mount_detail(&mock_server, "A1", detail_page("Only", "3", 0)).await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let result = harvester.crawl("lamp", 1, |_| {}).await.unwrap();

    assert_eq!(result.pages_walked, 1);
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn test_empty_listing_is_success_without_progress() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>No results for your search.</p></body></html>"),
        )
        .mount(&mock_server)
        .await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();

    let mut calls = 0;
    let result = harvester
        .crawl("nothing here", 3, |_| calls += 1)
        .await
        .expect("An empty listing should not be an error");

    assert!(result.is_empty());
    assert_eq!(result.urls_discovered, 0);
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn test_failed_listing_degrades_to_empty_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();
    let result = harvester.crawl("lamp", 2, |_| {}).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.pages_walked, 1);
}

#[tokio::test]
async fn test_invalid_page_count_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let harvester = Harvester::new(create_test_config(&mock_server.uri())).unwrap();

    assert!(harvester.crawl("lamp", 0, |_| {}).await.is_err());
    assert!(harvester.crawl("", 1, |_| {}).await.is_err());
}
