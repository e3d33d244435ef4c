//! Detail extractor - turns one product URL into a record

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{parse_product_page, DetailRules};
use crate::model::ProductRecord;
use std::sync::Arc;

/// Fetches and parses product detail pages
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    fetcher: Fetcher,
    rules: Arc<DetailRules>,
}

impl DetailExtractor {
    pub fn new(fetcher: Fetcher, rules: Arc<DetailRules>) -> Self {
        Self { fetcher, rules }
    }

    /// Extracts a product record from `url`
    ///
    /// Returns None when the fetcher gave up on the page. No retries happen
    /// here beyond the fetcher's own.
    pub async fn extract(&self, url: &str) -> Option<ProductRecord> {
        tracing::debug!("Fetching product: {}", url);
        let fetched = self.fetcher.fetch(url).await;

        let Some(html) = fetched.body else {
            tracing::debug!(
                "No content for {} after {} attempt(s)",
                url,
                fetched.attempts
            );
            return None;
        };

        let record = parse_product_page(&html, url, &self.rules);
        tracing::debug!(
            "Parsed {} ({} reviews, {} ratings)",
            url,
            record.reviews.len(),
            record.num_ratings
        );
        Some(record)
    }
}
