use crate::UrlError;
use url::form_urlencoded;
use url::Url;

/// Query-encodes a search keyword
///
/// The keyword is trimmed, spaces become `+`, and any other reserved byte is
/// percent-encoded so the result can be dropped straight into a query string.
///
/// # Examples
///
/// ```
/// use product_harvester::url::encode_keyword;
///
/// assert_eq!(encode_keyword("dyson vacuum").unwrap(), "dyson+vacuum");
/// assert_eq!(encode_keyword("usb-c & hdmi").unwrap(), "usb-c+%26+hdmi");
/// ```
pub fn encode_keyword(keyword: &str) -> Result<String, UrlError> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        return Err(UrlError::EmptyKeyword);
    }

    Ok(form_urlencoded::byte_serialize(trimmed.as_bytes()).collect())
}

/// Resolves a product link to an absolute URL without its query string
///
/// Listing pages decorate product anchors with tracking parameters; the same
/// product reached from two pages should yield the same URL, so the query and
/// fragment are dropped before resolution.
///
/// Returns None for empty, script, fragment-only, or non-HTTP(S) links, and
/// for links that leave the origin of `base_url`.
pub fn resolve_product_url(base_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    let without_query = href.split(['?', '#']).next().unwrap_or_default();

    let mut url = resolve(base_url, without_query)?;
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

/// Resolves a link to an absolute URL, keeping its query string
///
/// Used for pagination links, whose query carries the page state. Links to
/// another origin are dropped.
pub fn resolve_link(base_url: &Url, href: &str) -> Option<String> {
    resolve(base_url, href.trim()).map(|url| url.to_string())
}

fn resolve(base_url: &Url, href: &str) -> Option<Url> {
    if href.is_empty() {
        return None;
    }

    // Skip special schemes and same-page anchors
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
        || href.starts_with('#')
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url)
            if matches!(absolute_url.scheme(), "http" | "https")
                && absolute_url.origin() == base_url.origin() =>
        {
            Some(absolute_url)
        }
        _ => None,
    }
}
