//! Error types for the ads scraper library.

use thiserror::Error;

/// The main error type for all scraper core operations.
#[derive(Error, Debug)]
pub enum ScraperError {
    /// A configuration value failed validation at construction time
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The rate limiter has been closed; no further admissions are possible
    #[error("rate limiter is closed")]
    LimiterClosed,

    /// An ad record failed its field contract
    #[error("invalid ad record: {0}")]
    InvalidRecord(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// YAML configuration parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading configuration or creating output paths
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A search backend (browser/DOM layer) reported a failure
    #[error("search backend error: {0}")]
    Backend(String),
}

impl ScraperError {
    /// Create a configuration error from any displayable reason.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Create a backend error from any displayable reason.
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend(reason.into())
    }

    /// Check if this error means the rate limiter was shut down.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::LimiterClosed)
    }
}
