//! Sliding-window performance monitor.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use time::OffsetDateTime;

use crate::perf::{DEFAULT_WINDOW_SIZE, PerformanceReport, PerformanceStats};

/// Tracks recent scrape durations and outcomes for a session.
///
/// All operations are synchronous and cheap; the `&mut self` receivers are
/// the serialization discipline. Callers sharing one monitor across tasks
/// wrap it in a mutex, which preserves the lockstep eviction of the two
/// windows and the validity of the cached snapshot.
#[derive(Debug)]
pub struct PerformanceMonitor {
    window_size: usize,
    /// Recent durations in seconds, oldest first.
    scrape_times: VecDeque<f64>,
    /// Recent outcomes, evicted in lockstep with `scrape_times`.
    success_history: VecDeque<bool>,
    /// Lifetime counters; never evicted.
    total_requests: u64,
    successful_requests: u64,
    /// Session start, wall clock for reporting and monotonic for intervals.
    start_time: OffsetDateTime,
    started: Instant,
    cached_stats: Option<PerformanceStats>,
}

impl PerformanceMonitor {
    /// Create a monitor retaining the latest `window_size` samples.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            scrape_times: VecDeque::with_capacity(window_size),
            success_history: VecDeque::with_capacity(window_size),
            total_requests: 0,
            successful_requests: 0,
            start_time: OffsetDateTime::now_utc(),
            started: Instant::now(),
            cached_stats: None,
        }
    }

    /// Record one scrape operation.
    ///
    /// Appends to both sliding windows, evicting the oldest pair once the
    /// window is full, bumps the lifetime counters and invalidates the
    /// cached snapshot.
    pub fn add_scrape(&mut self, duration: Duration, success: bool) {
        if self.scrape_times.len() == self.window_size {
            self.scrape_times.pop_front();
            self.success_history.pop_front();
        }
        self.scrape_times.push_back(duration.as_secs_f64());
        self.success_history.push_back(success);

        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        }
        self.cached_stats = None;
    }

    /// Current statistics, memoized until the next [`PerformanceMonitor::add_scrape`].
    pub fn get_stats(&mut self) -> PerformanceStats {
        if let Some(stats) = self.cached_stats {
            return stats;
        }

        if self.scrape_times.is_empty() {
            return PerformanceStats::empty(self.start_time);
        }

        let count = self.scrape_times.len() as f64;
        let sum: f64 = self.scrape_times.iter().sum();
        let min = self.scrape_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.scrape_times.iter().copied().fold(0.0, f64::max);
        let successes = self.success_history.iter().filter(|s| **s).count() as f64;

        // Success rate covers the window only; throughput covers the whole
        // session, with the denominator floored at one minute.
        let elapsed_minutes = self.started.elapsed().as_secs_f64() / 60.0;
        let stats = PerformanceStats {
            avg_time: sum / count,
            min_time: min,
            max_time: max,
            success_rate: successes / count,
            total_requests: self.total_requests,
            successful_requests: self.successful_requests,
            requests_per_minute: self.total_requests as f64 / elapsed_minutes.max(1.0),
            start_time: self.start_time,
        };
        self.cached_stats = Some(stats);
        stats
    }

    /// Display-rounded report with uptime computed fresh at call time.
    pub fn report(&mut self) -> PerformanceReport {
        let uptime_minutes = self.started.elapsed().as_secs_f64() / 60.0;
        let stats = self.get_stats();
        PerformanceReport::new(&stats, uptime_minutes)
    }

    /// Clear all samples and counters and restart the session clock.
    pub fn reset(&mut self) {
        self.scrape_times.clear();
        self.success_history.clear();
        self.total_requests = 0;
        self.successful_requests = 0;
        self.start_time = OffsetDateTime::now_utc();
        self.started = Instant::now();
        self.cached_stats = None;
    }

    /// Configured sliding window capacity.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of samples currently retained in the window.
    pub fn sample_count(&self) -> usize {
        self.scrape_times.len()
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_example_statistics() {
        let mut monitor = PerformanceMonitor::new(100);
        monitor.add_scrape(secs(1.0), true);
        monitor.add_scrape(secs(3.0), false);
        monitor.add_scrape(secs(2.0), true);

        let stats = monitor.get_stats();
        assert_eq!(stats.avg_time, 2.0);
        assert_eq!(stats.min_time, 1.0);
        assert_eq!(stats.max_time, 3.0);
        assert!((stats.success_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.successful_requests, 2);
    }

    #[test]
    fn test_window_eviction_in_lockstep() {
        let mut monitor = PerformanceMonitor::new(3);
        monitor.add_scrape(secs(10.0), false);
        monitor.add_scrape(secs(2.0), true);
        monitor.add_scrape(secs(3.0), true);
        monitor.add_scrape(secs(4.0), true);

        // The first sample fell out of both windows.
        let stats = monitor.get_stats();
        assert_eq!(monitor.sample_count(), 3);
        assert_eq!(stats.avg_time, 3.0);
        assert_eq!(stats.min_time, 2.0);
        assert_eq!(stats.max_time, 4.0);
        assert_eq!(stats.success_rate, 1.0);
        // Lifetime counters still span the whole session.
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.successful_requests, 3);
    }

    #[test]
    fn test_empty_window_yields_baseline() {
        let mut monitor = PerformanceMonitor::new(10);
        let stats = monitor.get_stats();
        assert_eq!(stats, PerformanceStats::empty(stats.start_time));
        assert_eq!(stats.total_requests, 0);
    }

    #[test]
    fn test_stats_are_memoized_until_next_sample() {
        let mut monitor = PerformanceMonitor::new(10);
        monitor.add_scrape(secs(1.0), true);

        let first = monitor.get_stats();
        let second = monitor.get_stats();
        assert_eq!(first, second);

        monitor.add_scrape(secs(1.0), true);
        let third = monitor.get_stats();
        assert_eq!(third.total_requests, first.total_requests + 1);
    }

    #[test]
    fn test_requests_per_minute_uses_lifetime_total() {
        let mut monitor = PerformanceMonitor::new(2);
        for _ in 0..5 {
            monitor.add_scrape(secs(0.5), true);
        }

        // Within the first minute the denominator floors at 1, so the rate
        // equals the lifetime total even though the window holds 2 samples.
        let stats = monitor.get_stats();
        assert_eq!(stats.requests_per_minute, 5.0);
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut monitor = PerformanceMonitor::new(10);
        monitor.add_scrape(secs(2.0), true);
        monitor.add_scrape(secs(4.0), false);
        monitor.reset();

        let report = monitor.report();
        assert_eq!(report.total_requests, 0);
        assert_eq!(report.successful_requests, 0);
        assert_eq!(report.avg_time, 0.0);
        assert_eq!(report.success_rate, 0.0);
        assert!(report.uptime_minutes < 0.1);
    }

    #[test]
    fn test_report_rounds_for_display() {
        let mut monitor = PerformanceMonitor::new(10);
        monitor.add_scrape(secs(1.0), true);
        monitor.add_scrape(secs(2.0), false);

        let report = monitor.report();
        assert_eq!(report.avg_time, 1.5);
        assert_eq!(report.success_rate, 50.0);
        assert_eq!(report.total_requests, 2);
    }
}
