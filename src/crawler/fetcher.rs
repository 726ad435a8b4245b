//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a descriptive user agent
//! - Pacing every request through the rate controller
//! - Retrying transient failures (429, 5xx, timeouts, connection errors)
//! - Classifying every outcome into a document or a tagged failure

use crate::config::{Config, UserAgentConfig};
use crate::crawler::rate::RateController;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, RETRY_AFTER};
use reqwest::Client;
use scraper::Html;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A response as seen by the fetcher: status, headers and body text
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// The `Retry-After` header as a number of seconds
    ///
    /// The HTTP-date form is ignored.
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }
}

/// A request that produced no HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// The document source the fetcher drives: one GET with a caller timeout
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl PageSource for Client {
    async fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, TransportError> {
        let response = Client::get(self, url).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Why one attempt was worth retrying
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransientFailure {
    /// HTTP 429 or 5xx
    Server(u16),

    /// No response within the request timeout
    Timeout,

    /// Connection refused, reset, or body read failure
    Network(String),
}

impl TransientFailure {
    pub fn tag(&self) -> String {
        match self {
            Self::Server(status) => format!("http-{}", status),
            Self::Timeout => "timeout".to_string(),
            Self::Network(_) => "network".to_string(),
        }
    }
}

impl fmt::Display for TransientFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(status) => write!(f, "HTTP {}", status),
            Self::Timeout => write!(f, "timeout"),
            Self::Network(message) => write!(f, "{}", message),
        }
    }
}

impl From<TransportError> for TransientFailure {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => Self::Timeout,
            TransportError::Connect(message) | TransportError::Other(message) => {
                Self::Network(message)
            }
        }
    }
}

/// A fetch that did not produce a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// A non-retryable status (anything other than 200, 429 and 5xx)
    #[error("HTTP {status} for {url}")]
    Rejected { url: String, status: u16 },

    /// Every attempt failed transiently
    #[error("Failed after {attempts} attempts for {url}: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: TransientFailure,
    },
}

impl FetchError {
    /// Short tag stored against the URL in the progress index
    pub fn reason(&self) -> String {
        match self {
            Self::Rejected { status, .. } => format!("http-{}", status),
            Self::Exhausted { last, .. } => format!("exhausted: {}", last.tag()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use ocdb_harvest::config::UserAgentConfig;
/// use ocdb_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));

    Client::builder()
        .user_agent(config.header_value())
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with pacing, retry and failure classification
///
/// Owns the rate controller: the crawl has a single worker, so the delay
/// state needs no synchronization.
pub struct FetchClient<S = Client> {
    source: S,
    rate: RateController,
    max_retries: u32,
    timeout: Duration,
}

impl FetchClient<Client> {
    /// Builds a client backed by reqwest from the crawl configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::new(client, config))
    }
}

impl<S: PageSource> FetchClient<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            rate: RateController::new(&config.rate_limit),
            max_retries: config.crawler.max_retries.max(1),
            timeout: Duration::from_secs(config.crawler.request_timeout_secs),
        }
    }

    pub fn rate(&self) -> &RateController {
        &self.rate
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches a URL and parses it into a document
    pub async fn fetch(&mut self, url: &str) -> Result<Html, FetchError> {
        let body = self.fetch_body(url).await?;
        Ok(Html::parse_document(&body))
    }

    /// Fetches a URL's body text with full retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Success, decay delay |
    /// | HTTP 429 | Back off (at least `Retry-After`), retry |
    /// | HTTP 5xx | Back off, retry |
    /// | Other HTTP status | Immediate → Rejected |
    /// | Timeout / connection error | Back off, retry |
    /// | Retries exhausted | Exhausted with last failure |
    pub async fn fetch_body(&mut self, url: &str) -> Result<String, FetchError> {
        let mut last = TransientFailure::Timeout;

        for attempt in 1..=self.max_retries {
            self.rate.wait().await;
            let mut retry_after = None;

            let failure = match self.source.get(url, self.timeout).await {
                Ok(response) if response.status == 200 => {
                    self.rate.on_success();
                    return Ok(response.body);
                }
                Ok(response) if response.status == 429 => {
                    tracing::warn!("Rate limited (429) on {}, attempt {}", url, attempt);
                    retry_after = response.retry_after();
                    TransientFailure::Server(response.status)
                }
                Ok(response) if response.status >= 500 => {
                    tracing::warn!(
                        "Server error ({}) on {}, attempt {}",
                        response.status,
                        url,
                        attempt
                    );
                    TransientFailure::Server(response.status)
                }
                Ok(response) => {
                    tracing::warn!("HTTP {} for {}", response.status, url);
                    return Err(FetchError::Rejected {
                        url: url.to_string(),
                        status: response.status,
                    });
                }
                Err(e) => {
                    tracing::warn!("Request error on {}, attempt {}: {}", url, attempt, e);
                    TransientFailure::from(e)
                }
            };

            self.rate.on_failure();
            if let Some(hint) = retry_after {
                self.rate.hold_at_least(hint);
            }
            last = failure;
        }

        tracing::warn!("Failed after {} attempts: {}", self.max_retries, url);
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.max_retries,
            last,
        })
    }
}
