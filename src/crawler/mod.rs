//! Crawler module for mirroring a site
//!
//! This module contains the core crawling logic, including:
//! - The URL frontier (claim-once deduplication, depth and page limits)
//! - HTTP fetching behind an injectable trait
//! - HTML link extraction
//! - The supervisor that runs bounded concurrent fetch/extract/schedule cycles
//! - The lifecycle controller that wires interrupts and resume around it

mod fetcher;
mod frontier;
mod lifecycle;
mod parser;
mod supervisor;

pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::Frontier;
pub use lifecycle::{interrupt_signal, prepare, run_mirror, run_until, FORCE_EXIT_CODE};
pub use parser::{extract_links, is_html};
pub use supervisor::{CrawlTask, Supervisor};
