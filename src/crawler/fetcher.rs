//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the monitor, including:
//! - Building a reusable HTTP client with the configured timeout
//! - Browser-like request headers with optional identity rotation
//! - Linear retry back-off with jitter for transport failures
//! - Error classification for log output

use crate::config::ScraperConfig;
use crate::crawler::user_agent::pick_user_agent;
use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::Client;
use std::time::Duration;

/// Upper bound of the random jitter added to each retry wait
const RETRY_JITTER: Duration = Duration::from_secs(1);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Every attempt failed
    Failed {
        /// Number of attempts made
        attempts: u32,
        /// Description of the last failure
        error: String,
    },
}

impl FetchResult {
    /// Returns the page body, or `None` if the fetch failed
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// How often and how patiently a page is retried
///
/// | Attempt failed | Wait before next attempt       |
/// |----------------|--------------------------------|
/// | 1              | delay × 1 + jitter [0, 1s)     |
/// | 2              | delay × 2 + jitter [0, 1s)     |
/// | n              | delay × n + jitter [0, 1s)     |
///
/// No wait follows the final attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Base delay multiplied by the attempt number
    pub delay: Duration,
    /// Upper bound (exclusive) of the random jitter
    pub max_jitter: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            delay: config.delay(),
            max_jitter: RETRY_JITTER,
        }
    }

    /// Time to wait after the given (1-based) attempt failed
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.delay * attempt + random_jitter(self.max_jitter)
    }
}

/// Draws a uniformly distributed duration in `[0, max)`
pub(crate) fn random_jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    let secs = rand::thread_rng().gen_range(0.0..max.as_secs_f64());
    Duration::from_secs_f64(secs)
}

/// Builds an HTTP client with proper configuration
///
/// The client owns the connection pool reused across all page requests.
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.request_timeout();

    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the header set of a regular browser navigation
///
/// `Accept-Encoding` is left to the client so that response bodies are
/// decompressed transparently.
pub fn browser_headers(rotate_user_agent: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.8,en-US;q=0.5,en;q=0.3"),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(pick_user_agent(rotate_user_agent)),
    );
    headers
}

/// Page fetcher with retry logic
///
/// Requests are issued one at a time; the fetcher never returns an error,
/// exhausted retries are reported as [`FetchResult::Failed`].
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    rotate_user_agent: bool,
}

impl Fetcher {
    /// Creates a fetcher from the scraper configuration
    pub fn new(config: &ScraperConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            retry: RetryPolicy::from_config(config),
            rotate_user_agent: config.rotate_user_agent,
        })
    }

    /// Replaces the retry policy derived from the configuration
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetches a URL, retrying transport failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Timeout | Retry with back-off |
    /// | Connection error | Retry with back-off |
    /// | Non-2xx status | Retry with back-off |
    /// | Body read error | Retry with back-off |
    /// | Attempts exhausted | Return `Failed` |
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    ///
    /// # Returns
    ///
    /// A FetchResult with the page body or the last failure
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let max_attempts = self.retry.max_attempts;
        let mut last_error = String::from("no attempt was made");

        for attempt in 1..=max_attempts {
            match self.try_fetch(url).await {
                Ok(result) => return result,
                Err(e) => {
                    last_error = classify_error(&e);
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        max_attempts,
                        url,
                        last_error
                    );

                    if attempt < max_attempts {
                        let wait = self.retry.backoff(attempt);
                        tracing::info!("Waiting {:.2}s before retrying", wait.as_secs_f64());
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        tracing::error!(
            "Failed to fetch {} after {} attempts",
            url,
            max_attempts
        );

        FetchResult::Failed {
            attempts: max_attempts,
            error: last_error,
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<FetchResult, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .headers(browser_headers(self.rotate_user_agent))
            .send()
            .await?
            .error_for_status()?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(FetchResult::Success {
            final_url,
            status_code,
            body,
        })
    }
}

/// Describes a request failure for log output
fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if let Some(status) = e.status() {
        format!("HTTP {}", status.as_u16())
    } else {
        e.to_string()
    }
}
