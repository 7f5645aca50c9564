use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates a crawl root URL
///
/// The root must use HTTP or HTTPS and carry a host. The fragment is dropped so the
/// root maps to the same frontier key as any link pointing back at it.
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::parse_root_url;
///
/// let url = parse_root_url("http://example.com/docs#intro").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs");
/// ```
pub fn parse_root_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Computes the frontier key of a URL
///
/// The key is the identity the frontier deduplicates on:
///
/// 1. Scheme, as parsed (already lowercase)
/// 2. Host, lowercased
/// 3. Port, only when it differs from the scheme default
/// 4. Path with any trailing slash removed, except for the root `/`
/// 5. Query string, verbatim
///
/// The fragment never takes part in the key. Dot segments and default ports have
/// already been resolved by the `url` parser.
///
/// Merging `/docs` and `/docs/` is only safe for deduplication. The two spellings
/// resolve relative links differently, so extraction uses the URL the response
/// was actually served from (see `FetchedPage::final_url`), never the key.
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::frontier_key;
/// use url::Url;
///
/// let a = Url::parse("http://Example.com/docs/#top").unwrap();
/// let b = Url::parse("http://example.com/docs").unwrap();
/// assert_eq!(frontier_key(&a), frontier_key(&b));
/// ```
pub fn frontier_key(url: &Url) -> String {
    let mut key = String::with_capacity(url.as_str().len());

    key.push_str(url.scheme());
    key.push_str("://");
    if let Some(host) = url.host_str() {
        key.push_str(&host.to_lowercase());
    }
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }

    key.push_str(&normalize_path(url.path()));

    if let Some(query) = url.query() {
        key.push('?');
        key.push_str(query);
    }

    key
}

/// Removes a trailing slash from a non-root path; an empty path becomes `/`
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> String {
        frontier_key(&Url::parse(s).unwrap())
    }

    #[test]
    fn test_remove_fragment() {
        assert_eq!(key("http://example.com/page#section"), "http://example.com/page");
    }

    #[test]
    fn test_trailing_slash_equivalence() {
        assert_eq!(key("http://example.com/docs/"), key("http://example.com/docs"));
    }

    #[test]
    fn test_keep_root_slash() {
        assert_eq!(key("http://example.com"), "http://example.com/");
        assert_eq!(key("http://example.com/"), "http://example.com/");
    }

    #[test]
    fn test_query_is_part_of_key() {
        assert_ne!(key("http://example.com/p?a=1"), key("http://example.com/p?a=2"));
        assert_eq!(key("http://example.com/p?a=1#x"), "http://example.com/p?a=1");
    }

    #[test]
    fn test_lowercase_host_keeps_path_case() {
        assert_eq!(key("http://EXAMPLE.COM/Page"), "http://example.com/Page");
    }

    #[test]
    fn test_scheme_distinguishes_keys() {
        assert_ne!(key("http://example.com/"), key("https://example.com/"));
    }

    #[test]
    fn test_default_port_dropped_custom_port_kept() {
        assert_eq!(key("http://example.com:80/a"), "http://example.com/a");
        assert_eq!(key("http://127.0.0.1:8080/a"), "http://127.0.0.1:8080/a");
    }

    #[test]
    fn test_dot_segments_resolved() {
        assert_eq!(key("http://example.com/a/../b/./c"), "http://example.com/b/c");
    }

    #[test]
    fn test_parse_root_url() {
        let url = parse_root_url("  https://example.com/start#frag ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/start");
    }

    #[test]
    fn test_parse_root_url_invalid_scheme() {
        let result = parse_root_url("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_parse_root_url_malformed() {
        assert!(matches!(
            parse_root_url("not a url").unwrap_err(),
            UrlError::Parse(_)
        ));
    }
}
