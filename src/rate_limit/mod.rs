//! Rate limiting for outbound scraping actions.
//!
//! Search engines throttle and ban aggressive clients, so every outbound
//! action (search query, landing page fetch) must pass through admission
//! control before it is issued. This module provides an async token-bucket
//! limiter shared by all tasks of a scraping session.
//!
//! ## Admission model
//!
//! - Tokens refill continuously at `max_requests / time_window`.
//! - Capacity is `max_requests + burst_size`, so short bursts above the
//!   steady-state rate are allowed.
//! - `min_delay` is a floor on the computed wait between grants.
//!
//! ## Example
//!
//! ```rust
//! use ads_scraper::rate_limit::{RateLimiter, RateLimiterConfig};
//!
//! # async fn example() -> ads_scraper::Result<()> {
//! let limiter = RateLimiter::new(RateLimiterConfig::default())?;
//!
//! // Wait for admission before each outbound request.
//! limiter.acquire(Some("mercedes parts:Germany")).await?;
//!
//! // Shut down once the session is over.
//! limiter.close().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod limiter;

pub use config::RateLimiterConfig;
pub use limiter::RateLimiter;

/// Default maximum age for request history entries pruned on [`RateLimiter::close`].
pub const DEFAULT_HISTORY_MAX_AGE: std::time::Duration = std::time::Duration::from_secs(3600);
