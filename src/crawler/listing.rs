//! Listing walker - paginates the search-results endpoint
//!
//! Pagination is followed as a server-driven linked list: page 1 is built
//! from the keyword, and every later page is whatever the previous page's
//! "next" link points at. The walk ends at the requested page count, at a page
//! without a next link, or at a page whose fetch produced no content.

use crate::config::HarvestConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{parse_listing_page, ListingRules};
use crate::url::build_search_url;
use crate::HarvestError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Product links collected from one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPageResult {
    /// 1-based page number
    pub page: u32,

    /// URL the page was fetched from
    pub url: String,

    /// Product URLs kept from this page (after dedupe, if enabled)
    pub product_urls: Vec<String>,
}

/// Walks search-results pages and collects product URLs
#[derive(Debug, Clone)]
pub struct ListingWalker {
    fetcher: Fetcher,
    rules: Arc<ListingRules>,
    base_url: Url,
    config: Arc<HarvestConfig>,
}

impl ListingWalker {
    pub fn new(
        fetcher: Fetcher,
        rules: Arc<ListingRules>,
        base_url: Url,
        config: Arc<HarvestConfig>,
    ) -> Self {
        Self {
            fetcher,
            rules,
            base_url,
            config,
        }
    }

    /// Walks up to `max_pages` listing pages for `keyword`
    ///
    /// Page N+1 is never requested before page N's next link is known. A page
    /// whose fetch fails contributes nothing and ends the walk, since its next
    /// link is unknown.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ListingPageResult>)` - One entry per page fetched, possibly empty
    /// * `Err(HarvestError)` - The keyword could not be turned into a search URL
    pub async fn walk(
        &self,
        keyword: &str,
        max_pages: u32,
    ) -> Result<Vec<ListingPageResult>, HarvestError> {
        let mut next_url = Some(build_search_url(&self.config.site, keyword, 1)?.to_string());
        let mut seen = HashSet::new();
        let mut pages = Vec::new();
        let mut page_number = 1;

        while let Some(url) = next_url.take() {
            if page_number > max_pages {
                break;
            }

            tracing::info!("Scraping listing page {}: {}", page_number, url);
            let fetched = self.fetcher.fetch(&url).await;

            let Some(html) = fetched.body else {
                tracing::warn!(
                    "Listing page {} returned no content after {} attempt(s); stopping",
                    page_number,
                    fetched.attempts
                );
                pages.push(ListingPageResult {
                    page: page_number,
                    url,
                    product_urls: Vec::new(),
                });
                break;
            };

            let listing = parse_listing_page(&html, &self.base_url, &self.rules);
            tracing::info!(
                "Found {} product containers, {} product links",
                listing.containers,
                listing.product_urls.len()
            );

            let product_urls = if self.config.crawler.dedupe_urls {
                listing
                    .product_urls
                    .into_iter()
                    .filter(|u| seen.insert(u.clone()))
                    .collect()
            } else {
                listing.product_urls
            };

            pages.push(ListingPageResult {
                page: page_number,
                url,
                product_urls,
            });

            match listing.next_page {
                Some(next) if page_number < max_pages => {
                    next_url = Some(next);
                    page_number += 1;
                    let delay = Duration::from_millis(self.config.crawler.page_delay_ms);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Some(_) => {}
                None => {
                    tracing::debug!("No next-page link on page {}", page_number);
                }
            }
        }

        Ok(pages)
    }
}
