//! URL handling module for Product Harvester
//!
//! This module builds search-results URLs from a keyword and resolves the
//! links discovered on listing pages into absolute URLs.

mod normalize;

use crate::config::SiteConfig;
use crate::UrlError;
use url::Url;

// Re-export main functions
pub use normalize::{encode_keyword, resolve_link, resolve_product_url};

/// Parses the configured base URL
pub fn parse_base_url(site: &SiteConfig) -> Result<Url, UrlError> {
    let url = Url::parse(&site.base_url).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

/// Builds the search-results URL for a keyword and 1-based page number
///
/// # Examples
///
/// ```
/// use product_harvester::config::SiteConfig;
/// use product_harvester::url::build_search_url;
///
/// let site = SiteConfig {
///     base_url: "https://shop.example".to_string(),
///     ..SiteConfig::default()
/// };
/// let url = build_search_url(&site, "dyson vacuum", 1).unwrap();
/// assert_eq!(url.as_str(), "https://shop.example/s?k=dyson+vacuum&page=1");
/// ```
pub fn build_search_url(site: &SiteConfig, keyword: &str, page: u32) -> Result<Url, UrlError> {
    let encoded = encode_keyword(keyword)?;
    let mut url = parse_base_url(site)?
        .join(&site.search_path)
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    url.set_query(Some(&format!(
        "{}={}&{}={}",
        site.keyword_param, encoded, site.page_param, page
    )));

    Ok(url)
}
