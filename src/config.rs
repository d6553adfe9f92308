//! YAML-backed configuration for a scraping session.
//!
//! A session is driven by a single `scraper.yaml` file:
//!
//! ```yaml
//! headless: true
//! targets:
//!   keywords: ["mercedes engine parts", "bmw brake pads"]
//!   locations: ["Germany", "UK"]
//! rate_limit:
//!   max_requests: 10
//!   time_window: 60.0
//!   min_delay: 0.1
//!   burst_size: 3
//! ```
//!
//! Every section validates on load; a bad value fails [`ScraperConfig::from_yaml`]
//! instead of surfacing mid-session.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ScraperError;
use crate::rate_limit::RateLimiterConfig;

/// Logging verbosity for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive string for a `tracing_subscriber` env filter.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            // tracing has no level above error
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

/// Proxy rotation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Whether requests go through proxies at all.
    #[serde(default)]
    pub enabled: bool,
    /// Proxy URLs to rotate through.
    #[serde(default)]
    pub urls: Vec<String>,
    /// Seconds between proxy rotations.
    #[serde(default = "default_rotation_interval")]
    pub rotation_interval: u64,
    /// Attempts before giving up on a proxy.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl ProxyConfig {
    /// Validate the proxy settings.
    pub fn validate(&self) -> Result<(), ScraperError> {
        if self.enabled && self.urls.is_empty() {
            return Err(ScraperError::config("proxy URLs required when enabled"));
        }
        if self.rotation_interval == 0 {
            return Err(ScraperError::config("rotation_interval must be positive"));
        }
        if self.max_retries == 0 {
            return Err(ScraperError::config("max_retries must be positive"));
        }
        for url in &self.urls {
            let parsed = Url::parse(url)?;
            if parsed.host_str().is_none() {
                return Err(ScraperError::config(format!("invalid proxy URL: {url}")));
            }
        }
        Ok(())
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            urls: Vec::new(),
            rotation_interval: default_rotation_interval(),
            max_retries: default_max_retries(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level to emit.
    #[serde(default)]
    pub level: LogLevel,
    /// Log file path; `None` disables the file sink.
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
    /// Whether to also log to the console.
    #[serde(default = "default_true")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: default_log_file(),
            console: true,
        }
    }
}

/// What to search for.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetsConfig {
    /// Search keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Geographic locations to target.
    #[serde(default)]
    pub locations: Vec<String>,
}

impl TargetsConfig {
    /// Validate that there is at least one keyword and one location.
    pub fn validate(&self) -> Result<(), ScraperError> {
        if self.keywords.is_empty() {
            return Err(ScraperError::config("at least one keyword required"));
        }
        if self.locations.is_empty() {
            return Err(ScraperError::config("at least one location required"));
        }
        Ok(())
    }
}

/// Top-level scraper configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Run the browser without a visible window.
    #[serde(default = "default_true")]
    pub headless: bool,
    /// Proxy rotation settings.
    #[serde(default)]
    pub proxy: ProxyConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Keywords and locations to scrape.
    #[serde(default)]
    pub targets: TargetsConfig,
    /// Attempts per failed page action.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Random think-time between page actions, in seconds (min, max).
    #[serde(default = "default_delay_range")]
    pub delay_range: (u64, u64),
    /// Maximum concurrently running page tasks.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: u32,
    /// Admission control settings for outbound requests.
    #[serde(default)]
    pub rate_limit: RateLimiterConfig,
    /// Search engine base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Directory for result files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl ScraperConfig {
    /// Load and validate a configuration from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, ScraperError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ScraperError> {
        self.proxy.validate()?;
        self.targets.validate()?;
        self.rate_limit.validate()?;

        if self.retry_limit == 0 {
            return Err(ScraperError::config("retry_limit must be positive"));
        }
        if self.timeout == 0 {
            return Err(ScraperError::config("timeout must be positive"));
        }
        if self.delay_range.0 > self.delay_range.1 {
            return Err(ScraperError::config("invalid delay range"));
        }
        if self.max_concurrent == 0 {
            return Err(ScraperError::config("max_concurrent must be positive"));
        }

        let base = Url::parse(&self.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ScraperError::config(format!(
                "invalid URL scheme: {}",
                base.scheme()
            )));
        }
        if base.host_str().is_none() {
            return Err(ScraperError::config(format!(
                "invalid base URL: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Create the output directory if it does not exist.
    pub fn ensure_paths(&self) -> Result<(), ScraperError> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            proxy: ProxyConfig::default(),
            logging: LoggingConfig::default(),
            targets: TargetsConfig::default(),
            retry_limit: default_retry_limit(),
            timeout: default_timeout(),
            delay_range: default_delay_range(),
            max_concurrent: default_max_concurrent(),
            rate_limit: RateLimiterConfig::default(),
            base_url: default_base_url(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rotation_interval() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    3
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("scraper.log"))
}

fn default_retry_limit() -> u32 {
    3
}

fn default_timeout() -> u64 {
    10
}

fn default_delay_range() -> (u64, u64) {
    (2, 5)
}

fn default_max_concurrent() -> u32 {
    3
}

fn default_base_url() -> String {
    "https://www.google.com".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}
