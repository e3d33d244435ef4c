//! Product and review records produced by a crawl
//!
//! Records are plain data: once the detail extractor builds one it is never
//! mutated by the pipeline again. Field names are stable so presentation
//! layers can render them without touching HTML.

use serde::{Deserialize, Serialize};

/// One customer review scraped from a product detail page
///
/// Every field is independently optional; a review container whose markup
/// lacks a sub-element simply leaves that field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub author: Option<String>,
    pub rating_text: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub verified_text: Option<String>,
}

impl Review {
    /// Returns true if no field matched at all
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.rating_text.is_none()
            && self.title.is_none()
            && self.content.is_none()
            && self.date.is_none()
            && self.verified_text.is_none()
    }
}

/// Structured data for a single product detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product title
    pub title: Option<String>,

    /// Rating with the "out of 5 stars" suffix removed (e.g. "4.5")
    pub rating_text: Option<String>,

    /// Review count normalized from locale-formatted text, 0 when absent
    pub num_ratings: u64,

    /// Display price as shown on the page
    pub price_text: Option<String>,

    /// Primary product image URL
    pub image_url: Option<String>,

    /// Feature/description block
    pub description: Option<String>,

    /// Reviews in page order; empty when the page shows none
    pub reviews: Vec<Review>,

    /// Detail page the record was extracted from
    pub source_url: String,
}

impl ProductRecord {
    /// Numeric rating, if the rating text parses as a number
    pub fn rating_value(&self) -> Option<f64> {
        self.rating_text
            .as_deref()
            .and_then(|r| r.trim().parse::<f64>().ok())
    }
}
