//! Crawler module for search result fetching and listing extraction
//!
//! This module contains the core collection logic, including:
//! - HTTP fetching with retry logic and browser identities
//! - Listing field extraction with fallback strategies
//! - The price extraction cascade
//! - Sequential pagination over result pages

mod extractor;
mod fetcher;
mod paginator;
mod price;
mod user_agent;

pub use extractor::{
    extract_listing, parse_listing_page, ExtractError, PageExtraction, LISTING_SELECTOR,
};
pub use fetcher::{browser_headers, build_http_client, FetchResult, Fetcher, RetryPolicy};
pub use paginator::{Paginator, FULL_PAGE_THRESHOLD};
pub use user_agent::{pick_user_agent, BROWSER_USER_AGENTS, DEFAULT_USER_AGENT};

use crate::config::ScraperConfig;

/// Collects up to `limit` listings from a search results URL
///
/// Convenience wrapper building a [`Fetcher`] and [`Paginator`] from the
/// scraper configuration.
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `search_url` - A marketplace search results URL
/// * `limit` - Maximum number of listings to return
///
/// # Returns
///
/// * `Ok(Vec<ListingRecord>)` - Collected listings, possibly fewer than `limit`
/// * `Err(MonitorError)` - The client could not be built or the URL is invalid
pub async fn collect_listings(
    config: &ScraperConfig,
    search_url: &str,
    limit: usize,
) -> crate::Result<Vec<crate::ListingRecord>> {
    let fetcher = Fetcher::new(config)?;
    let paginator = Paginator::new(fetcher, config)?;
    paginator.collect(search_url, limit).await
}
