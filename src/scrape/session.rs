//! Rate-limited, monitored scraping session.

use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ScraperConfig, TargetsConfig};
use crate::error::ScraperError;
use crate::models::AdData;
use crate::perf::{PerformanceMonitor, PerformanceReport, PerformanceStats};
use crate::rate_limit::RateLimiter;
use crate::scrape::SearchBackend;

/// A scraping session wrapping a [`SearchBackend`] with admission control
/// and performance accounting.
///
/// Every backend call first waits on the shared rate limiter and is then
/// timed and recorded in the performance monitor, successful or not. The
/// limiter key is `keyword:location` for searches and the landing host for
/// enrichment, so per-key last-seen bookkeeping stays meaningful.
pub struct ScrapeSession<C> {
    backend: C,
    limiter: RateLimiter,
    monitor: Mutex<PerformanceMonitor>,
}

impl<C: SearchBackend> ScrapeSession<C> {
    /// Create a session from a validated configuration.
    pub fn new(backend: C, config: &ScraperConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            backend,
            limiter: RateLimiter::new(config.rate_limit.clone())?,
            monitor: Mutex::new(PerformanceMonitor::default()),
        })
    }

    /// Get a reference to the inner backend.
    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Get the session's rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run one rate-limited search, recording its duration and outcome.
    pub async fn search(
        &self,
        keyword: &str,
        location: &str,
    ) -> Result<Vec<AdData>, ScraperError> {
        let key = format!("{keyword}:{location}");
        self.limiter.acquire(Some(key.as_str())).await?;

        let start = Instant::now();
        let result = self.backend.search_ads(keyword, location).await;
        self.record(start, result.is_ok()).await;
        result
    }

    /// Visit one ad's landing page, recording its duration and outcome.
    pub async fn enrich(&self, ad: AdData) -> Result<AdData, ScraperError> {
        // Keyed by landing host so repeat visits to one site are visible
        // in the request history.
        let host = Url::parse(&ad.website_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        self.limiter.acquire(host.as_deref()).await?;

        let start = Instant::now();
        let result = self.backend.enrich(ad).await;
        self.record(start, result.is_ok()).await;
        result
    }

    /// Scrape every keyword/location pair, enriching each listing found.
    ///
    /// Backend failures are logged and skipped so one bad page does not
    /// abort the session; admission failures (a closed limiter) abort.
    pub async fn collect(&self, targets: &TargetsConfig) -> Result<Vec<AdData>, ScraperError> {
        let mut ads = Vec::new();

        for keyword in &targets.keywords {
            for location in &targets.locations {
                let found = match self.search(keyword, location).await {
                    Ok(found) => found,
                    Err(err @ ScraperError::LimiterClosed) => return Err(err),
                    Err(err) => {
                        warn!("Search for {keyword:?} in {location:?} failed, skipping: {err}");
                        continue;
                    }
                };
                debug!(
                    "Extracted {} sponsored listings for {keyword:?} in {location:?}",
                    found.len()
                );

                for ad in found {
                    match self.enrich(ad).await {
                        Ok(enriched) => ads.push(enriched),
                        Err(err @ ScraperError::LimiterClosed) => return Err(err),
                        Err(err) => warn!("Landing page visit failed, skipping: {err}"),
                    }
                }
            }
        }
        Ok(ads)
    }

    /// Current statistics snapshot.
    pub async fn stats(&self) -> PerformanceStats {
        self.monitor.lock().await.get_stats()
    }

    /// Display-rounded report of the session so far.
    pub async fn report(&self) -> PerformanceReport {
        self.monitor.lock().await.report()
    }

    /// Grants issued in the limiter's configured window.
    pub async fn recent_request_count(&self) -> usize {
        self.limiter.get_request_count(None).await
    }

    /// Close the limiter and return the final report.
    pub async fn finish(&self) -> Result<PerformanceReport, ScraperError> {
        self.limiter.close().await?;
        Ok(self.report().await)
    }

    async fn record(&self, start: Instant, success: bool) {
        self.monitor.lock().await.add_scrape(start.elapsed(), success);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::models::AdPosition;
    use crate::rate_limit::RateLimiterConfig;

    struct MockBackend {
        searches: AtomicUsize,
        fail_search: bool,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                searches: AtomicUsize::new(0),
                fail_search: false,
            }
        }

        fn failing() -> Self {
            Self {
                searches: AtomicUsize::new(0),
                fail_search: true,
            }
        }

        fn ad(keyword: &str, location: &str) -> AdData {
            AdData::builder(keyword, location, "https://example.com/parts", "OEM Parts")
                .ad_position(AdPosition::Top)
                .build()
                .unwrap()
        }
    }

    impl SearchBackend for MockBackend {
        async fn search_ads(
            &self,
            keyword: &str,
            location: &str,
        ) -> Result<Vec<AdData>, ScraperError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            if self.fail_search {
                return Err(ScraperError::backend("results page did not load"));
            }
            Ok(vec![Self::ad(keyword, location)])
        }

        async fn enrich(&self, ad: AdData) -> Result<AdData, ScraperError> {
            let mut ad = ad;
            ad.phone_number = Some("4930123456".to_string());
            Ok(ad)
        }
    }

    fn config() -> ScraperConfig {
        ScraperConfig {
            targets: TargetsConfig {
                keywords: vec!["mercedes engine parts".to_string()],
                locations: vec!["Germany".to_string(), "UK".to_string()],
            },
            rate_limit: RateLimiterConfig::new(
                100,
                Duration::from_secs(1),
                Duration::ZERO,
                10,
            )
            .unwrap(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_collect_records_every_operation() {
        let config = config();
        let session = ScrapeSession::new(MockBackend::new(), &config).unwrap();

        let ads = session.collect(&config.targets).await.unwrap();
        assert_eq!(ads.len(), 2);
        assert_eq!(ads[0].phone_number.as_deref(), Some("4930123456"));

        // 2 searches + 2 enrichments, all successful.
        let stats = session.stats().await;
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.successful_requests, 4);
        assert_eq!(stats.success_rate, 1.0);
    }

    #[tokio::test]
    async fn test_failed_searches_are_recorded_and_skipped() {
        let config = config();
        let session = ScrapeSession::new(MockBackend::failing(), &config).unwrap();

        let ads = session.collect(&config.targets).await.unwrap();
        assert!(ads.is_empty());

        let stats = session.stats().await;
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful_requests, 0);
        assert_eq!(stats.success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_search_keys_request_history() {
        let config = config();
        let session = ScrapeSession::new(MockBackend::new(), &config).unwrap();

        session.search("bmw brake pads", "UK").await.unwrap();
        session.search("bmw brake pads", "Germany").await.unwrap();
        assert_eq!(session.recent_request_count().await, 2);
    }

    #[tokio::test]
    async fn test_finish_closes_the_limiter() {
        let config = config();
        let session = ScrapeSession::new(MockBackend::new(), &config).unwrap();

        session.search("kw", "loc").await.unwrap();
        let report = session.finish().await.unwrap();
        assert_eq!(report.total_requests, 1);

        let result = session.search("kw", "loc").await;
        assert!(matches!(result, Err(ScraperError::LimiterClosed)));

        // collect aborts instead of skipping once the limiter is closed.
        let result = session.collect(&config.targets).await;
        assert!(matches!(result, Err(ScraperError::LimiterClosed)));
    }
}
