//! Crawler module for listing and product page processing
//!
//! This module contains the core crawl pipeline, including:
//! - HTTP fetching with retry logic
//! - HTML extraction driven by a selector mapping
//! - Listing pagination
//! - Detail page extraction
//! - Overall crawl coordination

mod coordinator;
mod detail;
mod fetcher;
mod listing;
mod parser;

pub use coordinator::{CrawlResult, Harvester};
pub use detail::DetailExtractor;
pub use fetcher::{
    build_http_client, retry_policy_from_config, AttemptOutcome, ExponentialBackoff, FetchResult,
    Fetcher, FixedDelay, RawResponse, ReqwestTransport, RetryPolicy, Transport, TransportError,
    TransportErrorKind,
};
pub use listing::{ListingPageResult, ListingWalker};
pub use parser::{
    extract_field, normalize_num_ratings, normalize_rating, parse_listing_page,
    parse_product_page, CompiledField, CompiledSelectors, DetailRules, ListingPage, ListingRules,
    ReviewRules,
};

use crate::config::HarvestConfig;
use crate::HarvestError;

/// Runs a complete crawl with a fresh HTTP client
///
/// Convenience entry point for one-off crawls. It will:
/// 1. Build the HTTP client and compile the selector mapping
/// 2. Walk up to `max_pages` listing pages
/// 3. Extract every discovered product under the concurrency cap
/// 4. Report progress through `on_progress`
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed; possibly with no records
/// * `Err(HarvestError)` - Invalid configuration or request
pub async fn crawl<F>(
    config: HarvestConfig,
    keyword: &str,
    max_pages: u32,
    on_progress: F,
) -> Result<CrawlResult, HarvestError>
where
    F: FnMut(f64),
{
    Harvester::new(config)?
        .crawl(keyword, max_pages, on_progress)
        .await
}
