//! Pipeline behavior observed through an instrumented transport
//!
//! The fake transport serves one listing page and any number of detail
//! pages, tracking how many detail requests are in flight at once.

use async_trait::async_trait;
use product_harvester::config::{HarvestConfig, HeaderConfig};
use product_harvester::crawler::{RawResponse, Transport, TransportError};
use product_harvester::Harvester;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const BASE: &str = "https://shop.example";

/// Serves a fixed listing and counts concurrent detail requests
struct InstrumentedShop {
    listing: String,
    detail_delay: HashMap<String, Duration>,
    default_delay: Duration,
    panic_on: Option<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    detail_requests: AtomicUsize,
}

impl InstrumentedShop {
    fn new(asins: &[String]) -> Self {
        let items: String = asins
            .iter()
            .map(|a| {
                format!(
                    r#"<div role="listitem" data-asin="{a}"><a class="a-link-normal" href="/dp/{a}?ref=sr">{a}</a></div>"#
                )
            })
            .collect();

        Self {
            listing: format!("<html><body>{items}</body></html>"),
            detail_delay: HashMap::new(),
            default_delay: Duration::from_millis(25),
            panic_on: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            detail_requests: AtomicUsize::new(0),
        }
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for InstrumentedShop {
    async fn get(
        &self,
        url: &str,
        _headers: &HeaderConfig,
        _timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let Some(asin) = url.strip_prefix(&format!("{BASE}/dp/")) else {
            return Ok(RawResponse {
                status: 200,
                body: self.listing.clone(),
            });
        };

        if self.panic_on.as_deref() == Some(asin) {
            panic!("transport blew up on {asin}");
        }

        self.detail_requests.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .detail_delay
            .get(asin)
            .copied()
            .unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(RawResponse {
            status: 200,
            body: format!(
                r#"<html><body><span id="productTitle">{asin}</span></body></html>"#
            ),
        })
    }
}

fn asins(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("P{i:02}")).collect()
}

fn harvester(shop: Arc<InstrumentedShop>, concurrency: usize) -> Harvester {
    let mut config = HarvestConfig::default();
    config.site.base_url = BASE.to_string();
    config.fetch.retry_delay_ms = 0;
    config.crawler.page_delay_ms = 0;
    config.crawler.max_concurrent_details = concurrency;
    Harvester::with_transport(config, shop).expect("valid config")
}

#[tokio::test]
async fn test_concurrency_cap_is_never_exceeded() {
    let shop = Arc::new(InstrumentedShop::new(&asins(20)));
    let harvester = harvester(shop.clone(), 5);

    let result = harvester.crawl("widget", 1, |_| {}).await.unwrap();

    assert_eq!(result.len(), 20);
    assert_eq!(shop.detail_requests.load(Ordering::SeqCst), 20);
    assert_eq!(shop.max_in_flight(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_cap_holds_on_multi_thread_runtime() {
    let shop = Arc::new(InstrumentedShop::new(&asins(20)));
    let harvester = harvester(shop.clone(), 5);

    let mut progress = Vec::new();
    let result = harvester
        .crawl("widget", 1, |p| progress.push(p))
        .await
        .unwrap();

    assert_eq!(result.len(), 20);
    assert!(shop.max_in_flight() <= 5);
    assert_eq!(progress.len(), 20);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*progress.last().unwrap(), 1.0);
}

#[tokio::test]
async fn test_custom_cap_is_honored() {
    let shop = Arc::new(InstrumentedShop::new(&asins(9)));
    let harvester = harvester(shop.clone(), 2);

    harvester.crawl("widget", 1, |_| {}).await.unwrap();

    assert_eq!(shop.max_in_flight(), 2);
}

#[tokio::test]
async fn test_results_arrive_in_completion_order() {
    let ids = asins(4);
    let mut shop = InstrumentedShop::new(&ids);
    // Later listing entries finish first
    for (i, asin) in ids.iter().enumerate() {
        shop.detail_delay
            .insert(asin.clone(), Duration::from_millis(40 * (4 - i as u64)));
    }
    let harvester = harvester(Arc::new(shop), 5);

    let result = harvester.crawl("widget", 1, |_| {}).await.unwrap();

    let titles: Vec<&str> = result
        .records
        .iter()
        .filter_map(|r| r.title.as_deref())
        .collect();
    assert_eq!(titles, vec!["P03", "P02", "P01", "P00"]);
}

#[tokio::test]
async fn test_panicking_worker_still_settles() {
    let mut shop = InstrumentedShop::new(&asins(6));
    shop.panic_on = Some("P03".to_string());
    let harvester = harvester(Arc::new(shop), 3);

    let mut progress = Vec::new();
    let result = harvester
        .crawl("widget", 1, |p| progress.push(p))
        .await
        .expect("a failed worker must not fail the crawl");

    assert_eq!(result.len(), 5);
    assert_eq!(result.urls_discovered, 6);
    assert_eq!(progress.len(), 6);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*progress.last().unwrap(), 1.0);
}

#[tokio::test]
async fn test_page_count_beyond_ten_is_accepted() {
    let shop = Arc::new(InstrumentedShop::new(&asins(3)));
    let harvester = harvester(shop.clone(), 5);

    let result = harvester
        .crawl("widget", 11, |_| {})
        .await
        .expect("large page counts are valid requests");

    assert_eq!(result.pages_walked, 1);
    assert_eq!(result.len(), 3);
}
