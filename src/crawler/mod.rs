//! Crawler module for polite episode fetching
//!
//! This module contains the core crawling logic, including:
//! - Adaptive request pacing
//! - HTTP fetching with retry and failure classification
//! - Episode listing discovery
//! - Overall crawl coordination

mod coordinator;
mod discovery;
mod fetcher;
mod rate;

pub use crate::config::RateLimitConfig;
pub use coordinator::{run_crawl, Coordinator, CrawlOptions, CrawlReport};
pub use discovery::{parse_listing, IndexDiscoverer};
pub use fetcher::{
    build_http_client, FetchClient, FetchError, PageSource, RawResponse, TransientFailure,
    TransportError,
};
pub use rate::RateController;
