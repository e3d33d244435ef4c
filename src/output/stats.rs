//! Statistics derived from a finished crawl
//!
//! This module summarizes a `CrawlResult` for display after the crawl ends.

use crate::crawler::CrawlResult;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Records extracted
    pub total_products: usize,

    /// Listing pages fetched
    pub pages_walked: u32,

    /// Product URLs sent to detail extraction
    pub urls_discovered: usize,

    /// URLs whose detail fetch produced no record
    pub failed_details: usize,

    /// Records with at least one review
    pub products_with_reviews: usize,

    /// Reviews across all records
    pub total_reviews: usize,

    /// Mean of the parsable ratings, if any
    pub average_rating: Option<f64>,

    pub duration_seconds: i64,
}

impl CrawlStatistics {
    pub fn from_result(result: &CrawlResult) -> Self {
        let ratings: Vec<f64> = result
            .records
            .iter()
            .filter_map(|r| r.rating_value())
            .collect();

        let average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        Self {
            total_products: result.records.len(),
            pages_walked: result.pages_walked,
            urls_discovered: result.urls_discovered,
            failed_details: result.urls_discovered.saturating_sub(result.records.len()),
            products_with_reviews: result
                .records
                .iter()
                .filter(|r| !r.reviews.is_empty())
                .count(),
            total_reviews: result.records.iter().map(|r| r.reviews.len()).sum(),
            average_rating,
            duration_seconds: result.duration().num_seconds(),
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");
    println!("Listing pages walked:  {}", stats.pages_walked);
    println!("Product URLs found:    {}", stats.urls_discovered);
    println!("Products extracted:    {}", stats.total_products);
    println!("Failed detail pages:   {}", stats.failed_details);
    println!("Products with reviews: {}", stats.products_with_reviews);
    println!("Total reviews:         {}", stats.total_reviews);
    match stats.average_rating {
        Some(avg) => println!("Average rating:        {:.2}", avg),
        None => println!("Average rating:        n/a"),
    }
    println!("Duration:              {}s", stats.duration_seconds);
}
