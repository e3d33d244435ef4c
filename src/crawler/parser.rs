//! HTML extraction for listing and detail pages
//!
//! Which element holds which field is configuration (`SelectorConfig`); this
//! module compiles that mapping once and applies it through one generic
//! primitive, `extract_field`. A selector that matches nothing leaves its
//! field absent and never affects the rest of the page.

use crate::config::{FieldSelector, SelectorConfig};
use crate::model::{ProductRecord, Review};
use crate::url::{resolve_link, resolve_product_url};
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A field selector with its CSS already parsed
#[derive(Debug, Clone)]
pub struct CompiledField {
    selector: Selector,
    attr: Option<String>,
}

impl CompiledField {
    pub fn compile(field: &FieldSelector) -> Result<Self, HarvestError> {
        Ok(Self {
            selector: compile_css(&field.selector)?,
            attr: field.attr.clone(),
        })
    }
}

/// Compiled selectors for search-results pages
#[derive(Debug, Clone)]
pub struct ListingRules {
    container: Selector,
    link: Selector,
    detail_marker: String,
    next_page: Selector,
}

/// Compiled selectors for a single review container
#[derive(Debug, Clone)]
pub struct ReviewRules {
    author: CompiledField,
    rating: CompiledField,
    title: CompiledField,
    content: CompiledField,
    date: CompiledField,
    verified: CompiledField,
}

/// Compiled selectors for product detail pages
#[derive(Debug, Clone)]
pub struct DetailRules {
    title: CompiledField,
    rating: CompiledField,
    num_ratings: CompiledField,
    price: CompiledField,
    image: CompiledField,
    description: CompiledField,
    rating_suffix: String,
    review_container: Selector,
    review: ReviewRules,
}

/// Every selector the crawler needs, parsed once per crawl
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub listing: ListingRules,
    pub detail: DetailRules,
}

impl CompiledSelectors {
    /// Parses every CSS selector in the mapping
    ///
    /// # Returns
    ///
    /// * `Ok(CompiledSelectors)` - All selectors parsed
    /// * `Err(HarvestError::Selector)` - The first selector that failed to parse
    pub fn compile(config: &SelectorConfig) -> Result<Self, HarvestError> {
        let listing = ListingRules {
            container: compile_css(&config.listing.container)?,
            link: compile_css(&config.listing.link)?,
            detail_marker: config.listing.detail_marker.clone(),
            next_page: compile_css(&config.listing.next_page)?,
        };

        let review = ReviewRules {
            author: CompiledField::compile(&config.review.author)?,
            rating: CompiledField::compile(&config.review.rating)?,
            title: CompiledField::compile(&config.review.title)?,
            content: CompiledField::compile(&config.review.content)?,
            date: CompiledField::compile(&config.review.date)?,
            verified: CompiledField::compile(&config.review.verified)?,
        };

        let detail = DetailRules {
            title: CompiledField::compile(&config.detail.title)?,
            rating: CompiledField::compile(&config.detail.rating)?,
            num_ratings: CompiledField::compile(&config.detail.num_ratings)?,
            price: CompiledField::compile(&config.detail.price)?,
            image: CompiledField::compile(&config.detail.image)?,
            description: CompiledField::compile(&config.detail.description)?,
            rating_suffix: config.detail.rating_suffix.clone(),
            review_container: compile_css(&config.detail.review_container)?,
            review,
        };

        Ok(Self { listing, detail })
    }
}

fn compile_css(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Extracts one optional field below `scope`
///
/// Reads the attribute when the field names one, otherwise the element text
/// with whitespace runs collapsed. Empty values count as absent.
pub fn extract_field(scope: ElementRef<'_>, field: &CompiledField) -> Option<String> {
    let element = scope.select(&field.selector).next()?;

    let value = match &field.attr {
        Some(attr) => element.value().attr(attr)?.trim().to_string(),
        None => collapse_whitespace(&element.text().collect::<String>()),
    };

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Links extracted from one search-results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Number of listing containers found, valid or not
    pub containers: usize,

    /// Absolute product URLs without query strings, in page order
    pub product_urls: Vec<String>,

    /// Absolute URL of the next results page, if the page links one
    pub next_page: Option<String>,
}

/// Extracts product links and the next-page link from a listing page
///
/// # Extraction Rules
///
/// - Only containers matching the container selector are considered
/// - Within a container, the first anchor whose path contains the detail
///   marker wins; containers without one are skipped
/// - Query strings are stripped before the href is resolved against `base_url`
pub fn parse_listing_page(html: &str, base_url: &Url, rules: &ListingRules) -> ListingPage {
    let document = Html::parse_document(html);
    let mut page = ListingPage::default();

    for container in document.select(&rules.container) {
        page.containers += 1;

        let href = container
            .select(&rules.link)
            .filter_map(|anchor| anchor.value().attr("href"))
            .find(|href| link_path(href).contains(&rules.detail_marker));

        if let Some(url) = href.and_then(|h| resolve_product_url(base_url, h)) {
            page.product_urls.push(url);
        }
    }

    page.next_page = document
        .select(&rules.next_page)
        .filter_map(|anchor| anchor.value().attr("href"))
        .find_map(|href| resolve_link(base_url, href));

    page
}

fn link_path(href: &str) -> &str {
    href.split(['?', '#']).next().unwrap_or_default()
}

/// Parses a product detail page into a record
///
/// Every field is extracted independently; the record is always built, even
/// from a page where nothing matched.
pub fn parse_product_page(html: &str, source_url: &str, rules: &DetailRules) -> ProductRecord {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let rating_text = extract_field(root, &rules.rating)
        .map(|rating| normalize_rating(&rating, &rules.rating_suffix))
        .filter(|rating| !rating.is_empty());
    let num_ratings_text = extract_field(root, &rules.num_ratings);

    let reviews = document
        .select(&rules.review_container)
        .map(|container| parse_review(container, &rules.review))
        .filter(|review| !review.is_empty())
        .collect();

    ProductRecord {
        title: extract_field(root, &rules.title),
        rating_text,
        num_ratings: normalize_num_ratings(num_ratings_text.as_deref()),
        price_text: extract_field(root, &rules.price),
        image_url: extract_field(root, &rules.image),
        description: extract_field(root, &rules.description),
        reviews,
        source_url: source_url.to_string(),
    }
}

fn parse_review(container: ElementRef<'_>, rules: &ReviewRules) -> Review {
    Review {
        author: extract_field(container, &rules.author),
        rating_text: extract_field(container, &rules.rating),
        title: extract_field(container, &rules.title),
        content: extract_field(container, &rules.content),
        date: extract_field(container, &rules.date),
        verified_text: extract_field(container, &rules.verified),
    }
}

/// Removes the fixed rating suffix
///
/// ```
/// use product_harvester::crawler::normalize_rating;
///
/// assert_eq!(normalize_rating("4.5 out of 5 stars", " out of 5 stars"), "4.5");
/// ```
pub fn normalize_rating(text: &str, suffix: &str) -> String {
    let text = text.trim();
    text.strip_suffix(suffix)
        .or_else(|| text.strip_suffix(suffix.trim()))
        .unwrap_or(text)
        .trim()
        .to_string()
}

/// Turns locale-formatted review-count text into an integer
///
/// Only the first whitespace-delimited token counts, with thousands
/// separators removed. Absent or unparsable text yields 0.
///
/// ```
/// use product_harvester::crawler::normalize_num_ratings;
///
/// assert_eq!(normalize_num_ratings(Some("1,234 ratings")), 1234);
/// assert_eq!(normalize_num_ratings(None), 0);
/// ```
pub fn normalize_num_ratings(text: Option<&str>) -> u64 {
    text.and_then(|t| t.split_whitespace().next())
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect::<String>()
        })
        .and_then(|digits| digits.parse::<u64>().ok())
        .unwrap_or(0)
}
