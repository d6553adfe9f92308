//! Derived performance statistics.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Immutable snapshot of scrape performance statistics.
///
/// Durations are in seconds. `success_rate` is a fraction of the retained
/// window; `requests_per_minute` is the lifetime total over elapsed session
/// minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Mean duration over the retained window, in seconds.
    pub avg_time: f64,
    /// Minimum duration over the retained window, in seconds.
    pub min_time: f64,
    /// Maximum duration over the retained window, in seconds.
    pub max_time: f64,
    /// Fraction of successful operations within the retained window.
    pub success_rate: f64,
    /// Lifetime operation count for the session.
    pub total_requests: u64,
    /// Lifetime successful operation count for the session.
    pub successful_requests: u64,
    /// Lifetime total over elapsed session minutes (floored at one minute).
    pub requests_per_minute: f64,
    /// Wall-clock session start.
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
}

impl PerformanceStats {
    /// The all-zero baseline for a session that started at `start_time`.
    pub fn empty(start_time: OffsetDateTime) -> Self {
        Self {
            avg_time: 0.0,
            min_time: 0.0,
            max_time: 0.0,
            success_rate: 0.0,
            total_requests: 0,
            successful_requests: 0,
            requests_per_minute: 0.0,
            start_time,
        }
    }
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self::empty(OffsetDateTime::now_utc())
    }
}

/// Display-oriented rendering of [`PerformanceStats`].
///
/// Durations and throughput are rounded to two decimals, the success rate
/// is a percentage rounded to one decimal, and `uptime_minutes` is computed
/// fresh at render time rather than from the cached snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Mean duration in seconds, rounded.
    pub avg_time: f64,
    /// Minimum duration in seconds, rounded.
    pub min_time: f64,
    /// Maximum duration in seconds, rounded.
    pub max_time: f64,
    /// Window success rate as a percentage.
    pub success_rate: f64,
    /// Lifetime operation count.
    pub total_requests: u64,
    /// Lifetime successful operation count.
    pub successful_requests: u64,
    /// Session throughput, rounded.
    pub requests_per_minute: f64,
    /// Minutes since the session started.
    pub uptime_minutes: f64,
}

impl PerformanceReport {
    /// Build a report from a snapshot and the current session uptime.
    pub fn new(stats: &PerformanceStats, uptime_minutes: f64) -> Self {
        Self {
            avg_time: round_to(stats.avg_time, 2),
            min_time: round_to(stats.min_time, 2),
            max_time: round_to(stats.max_time, 2),
            success_rate: round_to(stats.success_rate * 100.0, 1),
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            requests_per_minute: round_to(stats.requests_per_minute, 2),
            uptime_minutes: round_to(uptime_minutes, 1),
        }
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
