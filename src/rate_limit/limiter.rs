//! Token-bucket admission control.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ScraperError;
use crate::rate_limit::{DEFAULT_HISTORY_MAX_AGE, RateLimiterConfig};

/// Async rate limiter using the token bucket algorithm.
///
/// One limiter is shared by all tasks of a scraping session. Every mutation
/// of the token count, the refill instant and the request history happens
/// under a single mutex, and [`RateLimiter::acquire`] holds that mutex
/// across its wait loop, so refill, check, decrement and history write form
/// one atomic admission decision.
///
/// # Example
///
/// ```rust
/// use ads_scraper::rate_limit::{RateLimiter, RateLimiterConfig};
///
/// # async fn example() -> ads_scraper::Result<()> {
/// let limiter = RateLimiter::new(RateLimiterConfig::default())?;
/// limiter.acquire(Some("bmw brake pads:UK")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: Mutex<LimiterState>,
}

#[derive(Debug)]
struct LimiterState {
    /// Available tokens, bounded in `[0, max_requests + burst_size]`.
    tokens: f64,
    /// Monotonic instant of the last refill.
    last_refill: Instant,
    /// Caller-supplied key to the instant of its last grant.
    request_history: HashMap<String, Instant>,
    /// Terminal flag; all operations fail once set.
    closed: bool,
}

impl LimiterState {
    /// Accrue tokens for the time elapsed since the last refill.
    fn refill(&mut self, config: &RateLimiterConfig) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let accrued = elapsed.as_secs_f64() * config.tokens_per_second();
        self.tokens = (self.tokens + accrued).min(config.capacity());
        self.last_refill = now;
    }

    /// Drop history entries older than `max_age`. Returns how many were removed.
    fn prune_history(&mut self, max_age: Duration) -> usize {
        let now = Instant::now();
        let before = self.request_history.len();
        self.request_history
            .retain(|_, granted| now.duration_since(*granted) <= max_age);
        before - self.request_history.len()
    }
}

impl RateLimiter {
    /// Create a new rate limiter from a validated configuration.
    ///
    /// The bucket starts full at `max_requests` tokens. Fails with
    /// [`ScraperError::Config`] if the configuration is invalid.
    pub fn new(config: RateLimiterConfig) -> Result<Self, ScraperError> {
        config.validate()?;
        let state = LimiterState {
            tokens: f64::from(config.max_requests),
            last_refill: Instant::now(),
            request_history: HashMap::new(),
            closed: false,
        };
        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    /// Get the limiter configuration.
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Acquire a token for one outbound request, waiting if none is available.
    ///
    /// Only one admission decision is in flight at a time: the internal lock
    /// is held across the wait loop, so two callers can never both observe
    /// and consume the same token. When `key` is given, the grant instant is
    /// recorded against it in the request history.
    ///
    /// Dropping the returned future mid-wait is token-preserving: the
    /// decrement happens only after the wait loop exits, so an abandoned
    /// acquire never consumes a token.
    ///
    /// Fails with [`ScraperError::LimiterClosed`] after [`RateLimiter::close`],
    /// on every call, without consuming a token.
    pub async fn acquire(&self, key: Option<&str>) -> Result<(), ScraperError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(ScraperError::LimiterClosed);
        }

        state.refill(&self.config);

        while state.tokens <= 0.0 {
            let delay = self.grant_interval();
            debug!("Token bucket exhausted, waiting {:?} for refill", delay);
            tokio::time::sleep(delay).await;
            state.refill(&self.config);
        }

        state.tokens -= 1.0;
        if let Some(key) = key {
            state.request_history.insert(key.to_string(), Instant::now());
        }
        Ok(())
    }

    /// Time to generate one token, floored by the configured minimum delay.
    fn grant_interval(&self) -> Duration {
        let one_token = Duration::from_secs_f64(1.0 / self.config.tokens_per_second());
        one_token.max(self.config.min_delay)
    }

    /// Count history entries granted within `window` of now.
    ///
    /// Defaults to the configured `time_window`. Read-only: consumes no
    /// tokens and mutates no state.
    pub async fn get_request_count(&self, window: Option<Duration>) -> usize {
        let window = window.unwrap_or(self.config.time_window);
        let now = Instant::now();
        let state = self.state.lock().await;
        state
            .request_history
            .values()
            .filter(|granted| now.duration_since(**granted) <= window)
            .count()
    }

    /// Drop request history entries older than `max_age`.
    ///
    /// The history grows without bound otherwise; call this periodically
    /// for long-running sessions with many distinct keys.
    pub async fn cleanup_history(&self, max_age: Duration) {
        let mut state = self.state.lock().await;
        let removed = state.prune_history(max_age);
        if removed > 0 {
            debug!("Pruned {} stale request history entries", removed);
        }
    }

    /// Close the limiter, pruning stale history first.
    ///
    /// Waits for any in-flight admission decision to finish before
    /// finalizing. Idempotent: calls after the first are no-ops. All later
    /// [`RateLimiter::acquire`] calls fail with
    /// [`ScraperError::LimiterClosed`].
    pub async fn close(&self) -> Result<(), ScraperError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Ok(());
        }
        state.prune_history(DEFAULT_HISTORY_MAX_AGE);
        state.closed = true;
        info!("Rate limiter closed");
        Ok(())
    }

    /// Whether the limiter has been closed.
    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Tokens currently available, including accrual since the last refill.
    ///
    /// Clamped to `max_requests + burst_size`. Computed without mutating the
    /// bucket.
    pub async fn available_tokens(&self) -> f64 {
        let state = self.state.lock().await;
        let accrued = state.last_refill.elapsed().as_secs_f64() * self.config.tokens_per_second();
        (state.tokens + accrued).min(self.config.capacity())
    }
}
