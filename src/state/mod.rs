//! State module for tracking crawl progress
//!
//! This module provides the explicit state objects the coordinator owns and
//! threads through its loop.
//!
//! # Components
//!
//! - `CrawlPhase`: the phase of the current run (discovering, fetching, ...)
//! - `CrawlProgress`: durable completed/failed URL bookkeeping
//! - `EpisodeCollection`: the accumulated records, unique by URL

mod collection;
mod phase;
mod progress;

// Re-export main types
pub use collection::EpisodeCollection;
pub use phase::CrawlPhase;
pub use progress::{CrawlProgress, Reconciliation};
