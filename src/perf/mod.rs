//! Rolling-window performance accounting for scrape operations.
//!
//! The monitor keeps a fixed-capacity sliding window of recent operation
//! durations and outcomes next to lifetime counters spanning the whole
//! session. Derived statistics are computed on demand and memoized until
//! the next sample arrives.
//!
//! Two different horizons are intentional: the success rate reflects only
//! the retained window (recent health), while requests-per-minute divides
//! the lifetime total by elapsed session time (session throughput).
//!
//! ```rust
//! use std::time::Duration;
//! use ads_scraper::perf::PerformanceMonitor;
//!
//! let mut monitor = PerformanceMonitor::new(100);
//! monitor.add_scrape(Duration::from_millis(1500), true);
//! monitor.add_scrape(Duration::from_millis(900), false);
//!
//! let stats = monitor.get_stats();
//! assert_eq!(stats.total_requests, 2);
//! assert_eq!(stats.success_rate, 0.5);
//! ```

mod monitor;
mod stats;

pub use monitor::PerformanceMonitor;
pub use stats::{PerformanceReport, PerformanceStats};

/// Default sliding window capacity.
pub const DEFAULT_WINDOW_SIZE: usize = 100;
