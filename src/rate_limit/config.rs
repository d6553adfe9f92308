//! Rate limiter configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// Configuration for the token-bucket rate limiter.
///
/// All fields are validated when the configuration is constructed through
/// [`RateLimiterConfig::new`] and re-checked by
/// [`RateLimiter::new`](crate::rate_limit::RateLimiter::new), so an invalid
/// value fails fast instead of surfacing mid-session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Tokens replenished per time window.
    pub max_requests: u32,
    /// Length of the replenishment window.
    #[serde(with = "duration_secs")]
    pub time_window: Duration,
    /// Floor on the wait between individual grants.
    #[serde(with = "duration_secs")]
    pub min_delay: Duration,
    /// Extra token capacity above the steady-state maximum.
    pub burst_size: u32,
}

impl RateLimiterConfig {
    /// Create a validated configuration.
    pub fn new(
        max_requests: u32,
        time_window: Duration,
        min_delay: Duration,
        burst_size: u32,
    ) -> Result<Self, ScraperError> {
        let config = Self {
            max_requests,
            time_window,
            min_delay,
            burst_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values.
    ///
    /// `min_delay` and `burst_size` cannot go negative by construction
    /// (`Duration` and `u32`), so only the positivity checks remain.
    pub fn validate(&self) -> Result<(), ScraperError> {
        if self.max_requests == 0 {
            return Err(ScraperError::config("max_requests must be positive"));
        }
        if self.time_window.is_zero() {
            return Err(ScraperError::config("time_window must be positive"));
        }
        Ok(())
    }

    /// Steady-state token generation rate in tokens per second.
    pub(crate) fn tokens_per_second(&self) -> f64 {
        f64::from(self.max_requests) / self.time_window.as_secs_f64()
    }

    /// Token capacity ceiling (`max_requests + burst_size`).
    pub(crate) fn capacity(&self) -> f64 {
        f64::from(self.max_requests) + f64::from(self.burst_size)
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        // 10 requests per minute with a burst allowance of 3.
        Self {
            max_requests: 10,
            time_window: Duration::from_secs(60),
            min_delay: Duration::from_millis(100),
            burst_size: 3,
        }
    }
}

/// Serialize `Duration` as floating-point seconds for YAML/JSON configs.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        // Rejects non-finite, negative and overflowing values in one place.
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RateLimiterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.time_window, Duration::from_secs(60));
        assert_eq!(config.min_delay, Duration::from_millis(100));
        assert_eq!(config.burst_size, 3);
    }

    #[test]
    fn test_zero_max_requests_rejected() {
        let result = RateLimiterConfig::new(
            0,
            Duration::from_secs(60),
            Duration::from_millis(100),
            3,
        );
        assert!(matches!(result, Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_zero_time_window_rejected() {
        let result =
            RateLimiterConfig::new(10, Duration::ZERO, Duration::from_millis(100), 3);
        assert!(matches!(result, Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_zero_min_delay_and_burst_allowed() {
        let config = RateLimiterConfig::new(5, Duration::from_secs(1), Duration::ZERO, 0).unwrap();
        assert_eq!(config.burst_size, 0);
        assert_eq!(config.capacity(), 5.0);
    }

    #[test]
    fn test_token_rate() {
        let config = RateLimiterConfig::new(
            10,
            Duration::from_secs(60),
            Duration::from_millis(100),
            3,
        )
        .unwrap();
        let rate = config.tokens_per_second();
        assert!((rate - 10.0 / 60.0).abs() < 1e-9);
        assert_eq!(config.capacity(), 13.0);
    }

    #[test]
    fn test_yaml_rejects_out_of_range_durations() {
        // Values a Duration cannot represent must surface as a parse
        // error, not a panic inside deserialization.
        for bad in ["1.0e30", "-1.0", ".nan"] {
            let yaml = format!(
                "max_requests: 10\ntime_window: {bad}\nmin_delay: 0.1\nburst_size: 3\n"
            );
            let result = serde_yaml::from_str::<RateLimiterConfig>(&yaml);
            assert!(result.is_err(), "expected error for time_window {bad}");
        }
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = RateLimiterConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: RateLimiterConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
