use serde::Deserialize;

/// Main configuration structure for OCDB Harvest
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// configuration that crawls the public archive politely.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Absolute URL of the episode listing page
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}",
            self.crawler.base_url.trim_end_matches('/'),
            self.crawler.listing_path.trim_start_matches('/')
        )
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Root of the archive site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the listing page, relative to the base URL
    #[serde(rename = "listing-path")]
    pub listing_path: String,

    /// Attempts per URL before giving up on transient failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Persist progress after this many processed URLs
    #[serde(rename = "checkpoint-every")]
    pub checkpoint_every: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ocdb.cc".to_string(),
            listing_path: "/episodes/".to_string(),
            max_retries: 5,
            request_timeout_secs: 30,
            checkpoint_every: 10,
        }
    }
}

/// Adaptive delay policy between requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Floor of the delay between requests (milliseconds)
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    /// Ceiling the backoff can grow to (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    /// Multiplier applied to the delay after a successful request (< 1)
    #[serde(rename = "success-decay")]
    pub success_decay: f64,

    /// Multiplier applied to the delay after a failed request (> 1)
    #[serde(rename = "backoff-factor")]
    pub backoff_factor: f64,

    /// Upper bound of the random jitter added to each wait (milliseconds)
    #[serde(rename = "max-jitter-ms")]
    pub max_jitter_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1500,
            max_delay_ms: 30_000,
            success_decay: 0.9,
            backoff_factor: 2.0,
            max_jitter_ms: 500,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "OCDB-Harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://ocdb.cc/".to_string(),
            contact_email: "harvest@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the accumulated episode records
    #[serde(rename = "episodes-path")]
    pub episodes_path: String,

    /// Path to the progress index (completed and failed URLs)
    #[serde(rename = "progress-path")]
    pub progress_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            episodes_path: "only_connect_episodes.json".to_string(),
            progress_path: "scrape_progress.json".to_string(),
        }
    }
}
