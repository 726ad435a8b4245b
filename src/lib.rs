//! OCDB Harvest: a polite, resumable quiz-archive crawler
//!
//! This crate crawls an episode listing, fetches each episode page with
//! adaptive backoff, and extracts the four quiz rounds into normalized
//! episode records that survive interruption and resume.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("No episodes found at {listing_url}")]
    NoEpisodesFound { listing_url: String },

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlOptions, CrawlReport};
pub use extract::extract_episode;
pub use model::{EpisodeRecord, EpisodeStub};
pub use state::{CrawlPhase, CrawlProgress};
