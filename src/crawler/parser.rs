//! HTML link extraction
//!
//! Turns a page body into the same-origin links the crawl should follow. The
//! function holds no shared state and is safe to call from many tasks at once.

use crate::url::same_origin;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts every same-origin link from an HTML body
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `href` of every `<a>` element, resolved against `base`
///
/// **Exclude:**
/// - Links whose scheme or host differs from `base`
/// - Empty and fragment-only hrefs (same page)
/// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
///
/// Fragments are stripped and duplicates are dropped, keeping first-seen order.
/// The parser recovers from malformed markup the way browsers do, so broken HTML
/// still yields whatever anchors it contains; invalid bytes are decoded lossily.
///
/// # Example
///
/// ```
/// use sumi_mirror::crawler::extract_links;
/// use url::Url;
///
/// let html = br#"<a href="/about">About</a><a href="http://other.example/x">Other</a>"#;
/// let base = Url::parse("http://example.com/").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links, vec![Url::parse("http://example.com/about").unwrap()]);
/// ```
pub fn extract_links(body: &[u8], base: &Url) -> Vec<Url> {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let Some(absolute_url) = resolve_link(href, base) else {
                continue;
            };

            if !same_origin(base, &absolute_url) {
                continue;
            }

            if seen.insert(absolute_url.as_str().to_string()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Returns true if the content type may contain links worth following
///
/// A missing content type is treated as HTML.
pub fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.contains("text/html") || ct.contains("application/xhtml+xml")
        }
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - Empty or fragment-only hrefs
/// - Hrefs that do not resolve
fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base.join(href).ok()?;
    absolute_url.set_fragment(None);
    Some(absolute_url)
}
