//! Semantic checks applied to a loaded configuration

use crate::config::types::{Config, ScraperConfig, StorageConfig, MAX_DELAY_SECS};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_scraper_config(&config.scraper)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates fetching and pagination settings
fn validate_scraper_config(config: &ScraperConfig) -> ConfigResult<()> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "REQUEST_TIMEOUT must be at least 1 second".to_string(),
        ));
    }

    if config.max_retries == 0 {
        return Err(ConfigError::Validation(
            "MAX_RETRIES must be at least 1".to_string(),
        ));
    }

    // retry waits are delay × attempt and must fit in a Duration
    if !(0.0..=MAX_DELAY_SECS).contains(&config.delay_secs) {
        return Err(ConfigError::Validation(format!(
            "DELAY_BETWEEN_REQUESTS must be between 0 and {} seconds, got {}",
            MAX_DELAY_SECS, config.delay_secs
        )));
    }

    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid SITE_BASE_URL: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "SITE_BASE_URL must use http or https, got '{}'",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates persistence settings
fn validate_storage_config(config: &StorageConfig) -> ConfigResult<()> {
    if config.csv_directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "CSV_DIRECTORY cannot be empty".to_string(),
        ));
    }

    if !config.csv_filename_template.ends_with(".csv") {
        return Err(ConfigError::Validation(format!(
            "CSV_FILENAME_TEMPLATE must end with .csv, got '{}'",
            config.csv_filename_template
        )));
    }

    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "DB_PATH cannot be empty".to_string(),
        ));
    }

    Ok(())
}
