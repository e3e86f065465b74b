//! Search result pagination
//!
//! Drives the [`Fetcher`] across sequential result pages and collects the
//! extracted listings. Pages are requested strictly one after another with
//! a pause in between; collection ends at the listing limit, at a failed
//! fetch, at a page without listings, or after a page shorter than a full
//! page.

use crate::config::ScraperConfig;
use crate::crawler::extractor::parse_listing_page;
use crate::crawler::fetcher::{random_jitter, FetchResult, Fetcher};
use crate::listing::ListingRecord;
use crate::MonitorError;
use std::time::Duration;
use url::Url;

/// Listings per page on a full results page; fewer means the last page
pub const FULL_PAGE_THRESHOLD: usize = 50;

/// Upper bound of the random jitter added to the pause between pages
const PAGE_JITTER: Duration = Duration::from_secs(2);

/// Query parameter holding the page number
const PAGE_PARAM: &str = "p";

/// Query parameter asking for local listings first
const LOCAL_PRIORITY_PARAM: &str = "localPriority";

/// Why a collection run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    LimitReached,
    FetchFailed,
    EmptyPage,
    LastPage,
}

/// Multi-page listing collector
pub struct Paginator {
    fetcher: Fetcher,
    base_url: Url,
    local_priority: bool,
    page_delay: Duration,
    page_jitter: Duration,
}

impl Paginator {
    /// Creates a paginator from a fetcher and the scraper configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Paginator)` - Ready to collect
    /// * `Err(MonitorError)` - The configured base URL is not a valid URL
    pub fn new(fetcher: Fetcher, config: &ScraperConfig) -> crate::Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|source| MonitorError::UrlParse {
            url: config.base_url.clone(),
            source,
        })?;

        Ok(Self {
            fetcher,
            base_url,
            local_priority: config.local_priority,
            page_delay: config.delay(),
            page_jitter: PAGE_JITTER,
        })
    }

    /// Overrides the pause between pages (base delay and jitter bound)
    pub fn with_page_pause(mut self, delay: Duration, max_jitter: Duration) -> Self {
        self.page_delay = delay;
        self.page_jitter = max_jitter;
        self
    }

    /// Collects up to `limit` listings starting at the first results page
    ///
    /// A failed fetch is not an error: whatever was collected before it is
    /// returned.
    ///
    /// # Arguments
    ///
    /// * `search_url` - A marketplace search results URL
    /// * `limit` - Maximum number of listings to return
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ListingRecord>)` - Listings in page order, then in-page order
    /// * `Err(MonitorError)` - The search URL is invalid or not http(s)
    pub async fn collect(
        &self,
        search_url: &str,
        limit: usize,
    ) -> crate::Result<Vec<ListingRecord>> {
        let search_url = self.prepare_search_url(search_url)?;
        let mut records: Vec<ListingRecord> = Vec::new();

        if limit == 0 {
            return Ok(records);
        }

        let mut page: u32 = 1;
        let reason = loop {
            let page_url = page_url(&search_url, page);
            tracing::info!("Fetching page {}: {}", page, page_url);

            let body = match self.fetcher.fetch(page_url.as_str()).await {
                FetchResult::Success { body, .. } => body,
                FetchResult::Failed { attempts, error } => {
                    tracing::warn!(
                        "Giving up on page {} after {} attempts: {}",
                        page,
                        attempts,
                        error
                    );
                    break StopReason::FetchFailed;
                }
            };

            let remaining = limit - records.len();
            let extraction = match parse_listing_page(&body, &self.base_url, remaining) {
                Ok(extraction) => extraction,
                Err(e) => {
                    tracing::error!("Failed to parse page {}: {}", page, e);
                    break StopReason::EmptyPage;
                }
            };

            if extraction.fragment_count == 0 {
                tracing::info!("No listings on page {}", page);
                break StopReason::EmptyPage;
            }

            tracing::debug!(
                "Page {}: {} listings, {} extracted",
                page,
                extraction.fragment_count,
                extraction.records.len()
            );
            records.extend(extraction.records);

            if records.len() >= limit {
                break StopReason::LimitReached;
            }
            if extraction.fragment_count < FULL_PAGE_THRESHOLD {
                break StopReason::LastPage;
            }

            let pause = self.page_delay + random_jitter(self.page_jitter);
            tracing::debug!("Sleeping {:.2}s before page {}", pause.as_secs_f64(), page + 1);
            tokio::time::sleep(pause).await;
            page += 1;
        };

        tracing::info!(
            "Collected {} listings from {} page(s), stopped: {:?}",
            records.len(),
            page,
            reason
        );

        Ok(records)
    }

    /// Validates the search URL and adds the local-priority flag if wanted
    fn prepare_search_url(&self, search_url: &str) -> crate::Result<Url> {
        let mut url = Url::parse(search_url).map_err(|source| MonitorError::UrlParse {
            url: search_url.to_string(),
            source,
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(MonitorError::UnsupportedScheme(search_url.to_string()));
        }

        if self.local_priority && !url.query_pairs().any(|(k, _)| k == LOCAL_PRIORITY_PARAM) {
            url.query_pairs_mut().append_pair(LOCAL_PRIORITY_PARAM, "1");
        }

        Ok(url)
    }
}

/// Returns the search URL pointing at the given page, replacing any page
/// number already present
fn page_url(search_url: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = search_url
        .query_pairs()
        .filter(|(k, _)| k != PAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = search_url.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}
