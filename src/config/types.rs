use serde::Deserialize;

/// Main configuration structure for Product Harvester
///
/// Every section has defaults targeting the reference storefront, so an empty
/// TOML file (or `HarvestConfig::default()`) is a complete configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub site: SiteConfig,
    pub headers: HeaderConfig,
    pub fetch: FetchConfig,
    pub crawler: CrawlerConfig,
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Target site layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Scheme and host every discovered link is resolved against
    pub base_url: String,

    /// Path of the search-results endpoint
    pub search_path: String,

    /// Query parameter carrying the encoded keyword
    pub keyword_param: String,

    /// Query parameter carrying the 1-based page number
    pub page_param: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.amazon.sg".to_string(),
            search_path: "/s".to_string(),
            keyword_param: "k".to_string(),
            page_param: "page".to_string(),
        }
    }
}

/// Identifying headers sent with every request
///
/// The target serves different (or blocked) markup to default HTTP library
/// identifiers, so these are always set explicitly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HeaderConfig {
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Backoff shape between fetch attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

/// Per-request fetch and retry behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Total attempts per URL, including the first
    pub max_attempts: u32,

    /// Delay before a retry (base delay for exponential backoff)
    pub retry_delay_ms: u64,

    /// Upper bound on any single retry delay
    pub max_delay_ms: u64,

    /// Per-request timeout
    pub timeout_secs: u64,

    pub backoff: BackoffKind,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 1000,
            max_delay_ms: 30_000,
            timeout_secs: 30,
            backoff: BackoffKind::Fixed,
        }
    }
}

/// Crawl orchestration limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of detail pages fetched at once
    pub max_concurrent_details: usize,

    /// Pause between consecutive listing pages (milliseconds)
    pub page_delay_ms: u64,

    /// Drop product URLs already seen earlier in the same crawl
    pub dedupe_urls: bool,

    /// Largest page count a crawl request may ask for; unbounded when unset
    pub max_pages_limit: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_details: 5,
            page_delay_ms: 1000,
            dedupe_urls: true,
            max_pages_limit: None,
        }
    }
}

/// A CSS selector, optionally reading an attribute instead of element text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSelector {
    pub selector: String,
    #[serde(default)]
    pub attr: Option<String>,
}

impl FieldSelector {
    /// Selector whose element text is the field value
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: None,
        }
    }

    /// Selector whose attribute value is the field value
    pub fn attr(selector: &str, attr: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: Some(attr.to_string()),
        }
    }
}

/// Declarative field-to-selector mapping for all extracted pages
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub listing: ListingSelectors,
    pub detail: DetailSelectors,
    pub review: ReviewSelectors,
}

/// Selectors for search-results pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListingSelectors {
    /// Listing item containers that carry a product identifier
    pub container: String,

    /// Candidate anchors inside a container
    pub link: String,

    /// Path segment that marks an anchor as a product detail link
    pub detail_marker: String,

    /// Anchor pointing at the next results page
    pub next_page: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: r#"div[role="listitem"][data-asin]"#.to_string(),
            link: "a.a-link-normal[href]".to_string(),
            detail_marker: "/dp/".to_string(),
            next_page: "a.s-pagination-next[href]".to_string(),
        }
    }
}

/// Selectors for product detail pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DetailSelectors {
    pub title: FieldSelector,
    pub rating: FieldSelector,
    pub num_ratings: FieldSelector,
    pub price: FieldSelector,
    pub image: FieldSelector,
    pub description: FieldSelector,

    /// Trailing text removed from the rating (e.g. " out of 5 stars")
    pub rating_suffix: String,

    /// Repeated container holding one review each
    pub review_container: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            title: FieldSelector::text("#productTitle"),
            rating: FieldSelector::attr("#acrPopover", "title"),
            num_ratings: FieldSelector::text("#acrCustomerReviewText"),
            price: FieldSelector::text("span.a-price span.a-offscreen"),
            image: FieldSelector::attr("#landingImage", "src"),
            description: FieldSelector::text("#feature-bullets"),
            rating_suffix: " out of 5 stars".to_string(),
            review_container: "div.review".to_string(),
        }
    }
}

/// Selectors applied inside each review container
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReviewSelectors {
    pub author: FieldSelector,
    pub rating: FieldSelector,
    pub title: FieldSelector,
    pub content: FieldSelector,
    pub date: FieldSelector,
    pub verified: FieldSelector,
}

impl Default for ReviewSelectors {
    fn default() -> Self {
        Self {
            author: FieldSelector::text("span.a-profile-name"),
            rating: FieldSelector::text("i.review-rating"),
            title: FieldSelector::text("a.review-title span:not([class])"),
            content: FieldSelector::text("span.review-text"),
            date: FieldSelector::text("span.review-date"),
            verified: FieldSelector::text("span.a-size-mini"),
        }
    }
}

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Directory the export file is written to
    pub directory: String,

    /// Order records by review count, then rating, before export
    pub sort_by_popularity: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            directory: ".".to_string(),
            sort_by_popularity: true,
        }
    }
}
