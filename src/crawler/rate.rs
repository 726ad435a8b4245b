//! Adaptive request pacing
//!
//! The delay between requests starts at a floor, shrinks multiplicatively
//! after each success, and grows multiplicatively after each failure, never
//! leaving the `[floor, ceiling]` range.

use crate::config::RateLimitConfig;
use rand::Rng;
use std::time::{Duration, Instant};

/// Tracks the current inter-request delay for the crawl's single worker
#[derive(Debug, Clone)]
pub struct RateController {
    min_delay: Duration,
    max_delay: Duration,
    success_decay: f64,
    backoff_factor: f64,
    max_jitter: Duration,

    /// Current delay between the end of one wait and the next request
    delay: Duration,

    /// When the previous request was allowed through
    last_request: Option<Instant>,
}

/// Factor used when a configured decay is outside `(0, 1)`
const FALLBACK_DECAY: f64 = 0.9;

/// Factor used when a configured backoff is not a finite value above 1
const FALLBACK_BACKOFF: f64 = 2.0;

impl RateController {
    /// Out-of-range factors are replaced so the delay arithmetic never panics
    pub fn new(config: &RateLimitConfig) -> Self {
        let min_delay = Duration::from_millis(config.min_delay_ms);
        let success_decay = if config.success_decay > 0.0 && config.success_decay < 1.0 {
            config.success_decay
        } else {
            tracing::warn!(
                "success_decay {} out of range, using {}",
                config.success_decay,
                FALLBACK_DECAY
            );
            FALLBACK_DECAY
        };
        let backoff_factor = if config.backoff_factor > 1.0 && config.backoff_factor.is_finite() {
            config.backoff_factor
        } else {
            tracing::warn!(
                "backoff_factor {} out of range, using {}",
                config.backoff_factor,
                FALLBACK_BACKOFF
            );
            FALLBACK_BACKOFF
        };

        Self {
            min_delay,
            max_delay: Duration::from_millis(config.max_delay_ms).max(min_delay),
            success_decay,
            backoff_factor,
            max_jitter: Duration::from_millis(config.max_jitter_ms),
            delay: min_delay,
            last_request: None,
        }
    }

    /// The current delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Calculates the time until the next request may be made
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.delay).then(|| self.delay - elapsed)
    }

    /// Sleeps out the remainder of the current delay plus a random jitter,
    /// then records the new request time
    pub async fn wait(&mut self) {
        if let Some(remaining) = self.time_until_next_request(Instant::now()) {
            let pause = remaining + self.jitter();
            tracing::trace!("Waiting {:?} before next request", pause);
            tokio::time::sleep(pause).await;
        }
        self.last_request = Some(Instant::now());
    }

    /// Decays the delay toward the floor after a successful request
    pub fn on_success(&mut self) {
        self.delay = self.delay.mul_f64(self.success_decay).max(self.min_delay);
    }

    /// Grows the delay toward the ceiling after a failed request
    pub fn on_failure(&mut self) {
        self.delay = self.delay.mul_f64(self.backoff_factor).min(self.max_delay);
        tracing::warn!("Backing off, delay now {:.1}s", self.delay.as_secs_f64());
    }

    /// Raises the delay to at least `hint`, still capped at the ceiling
    pub fn hold_at_least(&mut self, hint: Duration) {
        self.delay = self.delay.max(hint.min(self.max_delay));
    }

    fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}
