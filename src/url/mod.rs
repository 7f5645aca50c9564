//! URL handling module for Sumi-Mirror
//!
//! This module provides root URL validation, the frontier key used for
//! deduplication, and the same-origin rule that keeps a crawl on one site.

mod normalize;

use url::Url;

// Re-export main functions
pub use normalize::{frontier_key, parse_root_url};

/// Returns true if two URLs share scheme, host and effective port
///
/// The port takes part in the comparison the same way it does in an HTTP `Host`
/// header: `http://example.com` and `http://example.com:80` are the same origin,
/// `http://example.com:8080` is not.
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::same_origin;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/").unwrap();
/// assert!(same_origin(&base, &Url::parse("http://example.com/about").unwrap()));
/// assert!(!same_origin(&base, &Url::parse("http://other.example/x").unwrap()));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    let host_matches = match (a.host_str(), b.host_str()) {
        (Some(left), Some(right)) => left.eq_ignore_ascii_case(right),
        _ => false,
    };

    a.scheme() == b.scheme() && host_matches && a.port_or_known_default() == b.port_or_known_default()
}
