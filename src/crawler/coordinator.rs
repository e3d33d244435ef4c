//! Crawler coordinator - main crawl orchestration logic
//!
//! This module ties the pipeline together:
//! - Validating the crawl request before any network activity
//! - Walking listing pages to collect product URLs
//! - Fanning detail extraction out under a concurrency cap
//! - Collecting records and reporting progress from a single consumer
//!
//! Fan-out workers never touch shared counters. Each one hands its outcome
//! to the consumer over a channel, and only the consumer updates the crawl
//! state and calls the progress callback.

use crate::config::{validate, HarvestConfig};
use crate::crawler::detail::DetailExtractor;
use crate::crawler::fetcher::{Fetcher, ReqwestTransport, Transport};
use crate::crawler::listing::ListingWalker;
use crate::crawler::parser::CompiledSelectors;
use crate::model::ProductRecord;
use crate::state::{CrawlPhase, CrawlState};
use crate::url::parse_base_url;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Records produced by one crawl, in arrival order
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Keyword the crawl searched for
    pub keyword: String,

    /// Extracted records in the order their detail fetches completed
    pub records: Vec<ProductRecord>,

    /// Listing pages fetched
    pub pages_walked: u32,

    /// Product URLs sent to the detail fan-out
    pub urls_discovered: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlResult {
    /// Returns true if the crawl found no products
    ///
    /// An empty result is a successful crawl that found nothing, not a failure.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// What a fan-out worker hands back to the consumer
struct DetailOutcome {
    url: String,
    record: Option<ProductRecord>,
}

/// Main crawler structure
///
/// One `Harvester` owns one shared transport (and so one connection pool)
/// used by every request of every crawl it runs.
#[derive(Debug, Clone)]
pub struct Harvester {
    config: Arc<HarvestConfig>,
    walker: ListingWalker,
    extractor: Arc<DetailExtractor>,
}

impl Harvester {
    /// Creates a harvester that talks HTTP through a pooled `reqwest` client
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to crawl
    /// * `Err(HarvestError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: HarvestConfig) -> Result<Self, HarvestError> {
        let transport = ReqwestTransport::from_config(&config.fetch)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a harvester on top of a caller-supplied transport
    pub fn with_transport(
        config: HarvestConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, HarvestError> {
        validate(&config)?;
        let selectors = CompiledSelectors::compile(&config.selectors)?;
        let base_url = parse_base_url(&config.site)?;

        let config = Arc::new(config);
        let fetcher = Fetcher::from_config(transport, &config);

        let walker = ListingWalker::new(
            fetcher.clone(),
            Arc::new(selectors.listing),
            base_url,
            config.clone(),
        );
        let extractor = Arc::new(DetailExtractor::new(fetcher, Arc::new(selectors.detail)));

        Ok(Self {
            config,
            walker,
            extractor,
        })
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Rejects malformed requests before any network activity
    pub fn validate_request(&self, keyword: &str, max_pages: u32) -> Result<(), HarvestError> {
        if keyword.trim().is_empty() {
            return Err(HarvestError::InvalidRequest(
                "keyword cannot be empty".to_string(),
            ));
        }

        if max_pages < 1 {
            return Err(HarvestError::InvalidRequest(
                "max_pages must be at least 1".to_string(),
            ));
        }

        if let Some(limit) = self.config.crawler.max_pages_limit {
            if max_pages > limit {
                return Err(HarvestError::InvalidRequest(format!(
                    "max_pages must be at most {}, got {}",
                    limit, max_pages
                )));
            }
        }

        Ok(())
    }

    /// Runs a complete crawl for `keyword` over at most `max_pages` listing pages
    ///
    /// # Algorithm
    ///
    /// 1. Walk listing pages and collect product URLs
    /// 2. Spawn one detail extraction per URL, gated by a semaphore
    /// 3. As each extraction settles, append its record (if any) and report
    ///    `completed / total` to `on_progress`
    /// 4. Return once every extraction has settled
    ///
    /// `on_progress` is called exactly once per settled extraction with a
    /// non-decreasing value ending at 1.0. It is never called when no product
    /// URLs were found.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Always, once the request itself is valid; failed
    ///   pages and products are simply missing from the result
    /// * `Err(HarvestError::InvalidRequest)` - Empty keyword, zero pages, or a
    ///   page count above the configured `max-pages-limit`
    pub async fn crawl<F>(
        &self,
        keyword: &str,
        max_pages: u32,
        mut on_progress: F,
    ) -> Result<CrawlResult, HarvestError>
    where
        F: FnMut(f64),
    {
        self.validate_request(keyword, max_pages)?;

        let mut state = CrawlState::new();
        tracing::info!(
            "Starting crawl for '{}' ({} page(s) max)",
            keyword.trim(),
            max_pages
        );

        state.transition(CrawlPhase::ListingInFlight)?;
        let pages = self.walker.walk(keyword, max_pages).await?;
        state.pages_walked = pages.len() as u32;

        let urls: Vec<String> = pages
            .into_iter()
            .flat_map(|page| page.product_urls)
            .collect();
        state.urls_discovered = urls.len();

        if urls.is_empty() {
            state.transition(CrawlPhase::Done)?;
            tracing::warn!("No product URLs found for '{}'", keyword.trim());
            return Ok(self.finish(keyword, Vec::new(), &state));
        }

        state.transition(CrawlPhase::DetailFanOut)?;
        tracing::info!(
            "Fetching {} product pages ({} at a time)",
            urls.len(),
            self.config.crawler.max_concurrent_details
        );

        let semaphore = Arc::new(Semaphore::new(self.config.crawler.max_concurrent_details));
        let (tx, mut rx) = mpsc::channel::<DetailOutcome>(urls.len());
        let mut workers = JoinSet::new();

        for url in urls {
            let semaphore = semaphore.clone();
            let extractor = self.extractor.clone();
            let tx = tx.clone();

            workers.spawn(async move {
                let record = match semaphore.acquire_owned().await {
                    Ok(_permit) => extractor.extract(&url).await,
                    Err(_) => None,
                };
                // The receiver outlives every worker, so this cannot fail
                let _ = tx.send(DetailOutcome { url, record }).await;
            });
        }
        drop(tx);

        let mut records = Vec::new();
        while let Some(outcome) = rx.recv().await {
            let kept = outcome.record.is_some();
            match outcome.record {
                Some(record) => records.push(record),
                None => tracing::debug!("No record for {}", outcome.url),
            }
            on_progress(state.record_completion(kept));
        }

        state.transition(CrawlPhase::Aggregating)?;

        // Workers that died without reporting still count as settled
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Detail worker failed: {}", e);
                on_progress(state.record_completion(false));
            }
        }

        state.transition(CrawlPhase::Done)?;
        Ok(self.finish(keyword, records, &state))
    }

    fn finish(&self, keyword: &str, records: Vec<ProductRecord>, state: &CrawlState) -> CrawlResult {
        debug_assert!(state.phase.is_terminal());

        let result = CrawlResult {
            keyword: keyword.trim().to_string(),
            records,
            pages_walked: state.pages_walked,
            urls_discovered: state.urls_discovered,
            started_at: state.started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl finished: {} product(s) from {} URL(s) across {} page(s) in {}s",
            state.records_kept,
            result.urls_discovered,
            result.pages_walked,
            result.duration().num_seconds()
        );

        result
    }
}
