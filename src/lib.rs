//! # Ads Scraper
//!
//! Async rate-limiting and performance-accounting core for a search ads
//! scraping pipeline.
//!
//! ## Features
//!
//! - Token-bucket admission control with burst capacity and per-key
//!   request history
//! - Rolling-window latency and success accounting with memoized snapshots
//! - YAML session configuration with fail-fast validation
//! - Typed records for sponsored listings and their landing page contacts
//! - A `SearchBackend` trait seam so the browser/DOM layer stays external
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use ads_scraper::perf::PerformanceMonitor;
//! use ads_scraper::rate_limit::{RateLimiter, RateLimiterConfig};
//!
//! #[tokio::main]
//! async fn main() -> ads_scraper::Result<()> {
//!     let limiter = RateLimiter::new(RateLimiterConfig::default())?;
//!     let mut monitor = PerformanceMonitor::default();
//!
//!     // Before each outbound request: wait for admission.
//!     limiter.acquire(Some("mercedes parts:Germany")).await?;
//!
//!     // After the request: account for it.
//!     monitor.add_scrape(Duration::from_millis(1200), true);
//!     println!("{:?}", monitor.report());
//!
//!     limiter.close().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod perf;
pub mod rate_limit;
pub mod scrape;

// Re-export commonly used types at crate root
pub use error::ScraperError;
pub use models::{AdData, AdPosition};
pub use perf::{PerformanceMonitor, PerformanceStats};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

/// Result type alias using ScraperError
pub type Result<T> = std::result::Result<T, ScraperError>;
