//! Configuration value types and their defaults

use std::path::PathBuf;
use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default number of attempts per page
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay between requests in seconds
pub const DEFAULT_DELAY_SECS: f64 = 2.0;

/// Upper bound for the delay between requests in seconds
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Default marketplace origin
pub const DEFAULT_BASE_URL: &str = "https://www.avito.ru";

/// Main configuration structure for Avito-Monitor
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub storage: StorageConfig,
}

/// Fetching and pagination behavior
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Total attempts for a single page before giving up
    pub max_retries: u32,

    /// Base delay between retries and between pages (seconds)
    pub delay_secs: f64,

    /// Pick a random browser identity for every request
    pub rotate_user_agent: bool,

    /// Origin prefixed to root-relative listing links
    pub base_url: String,

    /// Ask the marketplace to list the local region first
    pub local_priority: bool,
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            delay_secs: DEFAULT_DELAY_SECS,
            rotate_user_agent: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            local_priority: true,
        }
    }
}

/// Persistence locations
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding CSV snapshots
    pub csv_directory: PathBuf,

    /// File name template, `{date}` is replaced with the save timestamp
    pub csv_filename_template: String,

    /// Path to the SQLite database file
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            csv_directory: PathBuf::from("./data"),
            csv_filename_template: "avito_data_{date}.csv".to_string(),
            database_path: PathBuf::from("./data/avito.db"),
        }
    }
}
