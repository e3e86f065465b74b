//! Avito-Monitor: a classified-ad price monitor
//!
//! This crate fetches marketplace search result pages, extracts listing
//! records from markup that changes without notice, and computes price
//! statistics and anomaly signals over the extracted data.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod listing;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Avito-Monitor operations
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error for {url}: {source}")]
    UrlParse {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Unsupported URL scheme in {0}")]
    UnsupportedScheme(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] dotenvy::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Avito-Monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use analysis::{
    compare_with_previous, find_outliers, location_distribution, price_statistics,
    PriceComparison, PriceStatistics,
};
pub use config::Config;
pub use crawler::{Fetcher, Paginator};
pub use listing::ListingRecord;
pub use output::generate_summary;
