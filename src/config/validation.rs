use crate::config::types::{
    CrawlerConfig, FetchConfig, FieldSelector, HarvestConfig, HeaderConfig, OutputConfig,
    SelectorConfig, SiteConfig,
};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use scraper::Selector;
use url::Url;

/// Upper bound on concurrent detail fetches accepted from configuration
const MAX_DETAIL_CONCURRENCY: usize = 50;

/// Validates the entire configuration
pub fn validate(config: &HarvestConfig) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_header_config(&config.headers)?;
    validate_fetch_config(&config.fetch)?;
    validate_crawler_config(&config.crawler)?;
    validate_selectors(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if !config.search_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "search-path must start with '/', got '{}'",
            config.search_path
        )));
    }

    if config.keyword_param.is_empty() || config.page_param.is_empty() {
        return Err(ConfigError::Validation(
            "keyword-param and page-param cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates request headers
fn validate_header_config(config: &HeaderConfig) -> Result<(), ConfigError> {
    validate_header_value("user-agent", &config.user_agent)?;
    validate_header_value("accept-language", &config.accept_language)
}

/// Rejects values that could never be sent as an HTTP header
fn validate_header_value(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    HeaderValue::from_str(value).map_err(|_| {
        ConfigError::Validation(format!(
            "{} contains characters not allowed in an HTTP header",
            name
        ))
    })?;

    Ok(())
}

/// Validates fetch and retry settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_delay_ms < config.retry_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max-delay-ms ({}) must not be below retry-delay-ms ({})",
            config.max_delay_ms, config.retry_delay_ms
        )));
    }

    Ok(())
}

/// Validates crawl orchestration limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_details < 1 || config.max_concurrent_details > MAX_DETAIL_CONCURRENCY
    {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-details must be between 1 and {}, got {}",
            MAX_DETAIL_CONCURRENCY, config.max_concurrent_details
        )));
    }

    if config.max_pages_limit == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages-limit must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every configured selector is well-formed CSS
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let listing = &config.listing;
    for selector in [&listing.container, &listing.link, &listing.next_page] {
        validate_css(selector)?;
    }

    if listing.detail_marker.is_empty() {
        return Err(ConfigError::Validation(
            "detail-marker cannot be empty".to_string(),
        ));
    }

    let detail = &config.detail;
    for field in [
        &detail.title,
        &detail.rating,
        &detail.num_ratings,
        &detail.price,
        &detail.image,
        &detail.description,
    ] {
        validate_field(field)?;
    }
    validate_css(&detail.review_container)?;

    let review = &config.review;
    for field in [
        &review.author,
        &review.rating,
        &review.title,
        &review.content,
        &review.date,
        &review.verified,
    ] {
        validate_field(field)?;
    }

    Ok(())
}

fn validate_field(field: &FieldSelector) -> Result<(), ConfigError> {
    validate_css(&field.selector)?;

    if matches!(field.attr.as_deref(), Some(attr) if attr.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "attr for selector '{}' cannot be empty",
            field.selector
        )));
    }

    Ok(())
}

fn validate_css(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Validates export settings
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
