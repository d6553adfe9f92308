//! Session workflow tying admission control to a search backend.
//!
//! The browser/DOM layer lives behind the [`SearchBackend`] trait; this
//! module wraps any implementation with the rate limiter and the
//! performance monitor so that every outbound action waits for admission
//! and every completed action is accounted for.
//!
//! ```rust,ignore
//! use ads_scraper::config::ScraperConfig;
//! use ads_scraper::scrape::ScrapeSession;
//!
//! let config = ScraperConfig::from_yaml("scraper.yaml")?;
//! let session = ScrapeSession::new(browser_backend, &config)?;
//!
//! let ads = session.collect(&config.targets).await?;
//! let report = session.finish().await?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

mod session;

use std::future::Future;

pub use session::ScrapeSession;

use crate::error::ScraperError;
use crate::models::AdData;

/// Operations the browser/DOM layer provides to the session.
///
/// The trait enables mock implementations for testing and keeps the
/// driver dependency out of this crate. All methods are async and return
/// `Result<T, ScraperError>`.
pub trait SearchBackend: Send + Sync {
    /// Run one search and extract the sponsored listings from the results page.
    fn search_ads(
        &self,
        keyword: &str,
        location: &str,
    ) -> impl Future<Output = Result<Vec<AdData>, ScraperError>> + Send;

    /// Visit an ad's landing page and fill in contact details.
    fn enrich(&self, ad: AdData) -> impl Future<Output = Result<AdData, ScraperError>> + Send;
}
