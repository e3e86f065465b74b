//! Loading of `KEY=value` configuration files and environment overrides

use crate::config::types::{
    Config, ScraperConfig, StorageConfig, DEFAULT_BASE_URL, DEFAULT_DELAY_SECS,
    DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Files probed, in order, when no config path is given
const DEFAULT_CONFIG_FILES: [&str; 2] = ["config.env", ".env"];

/// Loads the configuration from a dotenv file and the process environment
///
/// When `path` is `None`, `config.env` and then `.env` in the working
/// directory are tried. Values already present in the process environment
/// take precedence over the file, and every key missing from both falls
/// back to its documented default.
///
/// # Arguments
///
/// * `path` - Optional path to a `KEY=value` configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use avito_monitor::config::load_config;
///
/// let config = load_config(None).unwrap();
/// println!("Timeout: {}s", config.scraper.request_timeout_secs);
/// ```
pub fn load_config(path: Option<&Path>) -> ConfigResult<Config> {
    let file_values = match resolve_config_path(path) {
        Some(found) => {
            tracing::info!("Loading configuration from {}", found.display());
            read_env_file(&found)?
        }
        None => {
            tracing::warn!("No configuration file found, using environment and defaults");
            HashMap::new()
        }
    };

    let config = build_config(|key| {
        std::env::var(key)
            .ok()
            .or_else(|| file_values.get(key).cloned())
    })?;

    validate(&config)?;

    Ok(config)
}

/// Reads a dotenv-style file into a key/value map without touching the
/// process environment
pub fn read_env_file(path: &Path) -> ConfigResult<HashMap<String, String>> {
    let mut values = HashMap::new();
    for entry in dotenvy::from_path_iter(path)? {
        let (key, value) = entry?;
        values.insert(key, value);
    }
    Ok(values)
}

fn resolve_config_path(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => {
            tracing::warn!("Configuration file {} not found", p.display());
            None
        }
        None => DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists()),
    }
}

/// Builds a configuration from a key lookup function
///
/// Decoupled from the real environment so it can be driven by a plain map.
pub(crate) fn build_config<F>(lookup: F) -> ConfigResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let raw_or = |key: &str, default: String| -> String {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    };

    let request_timeout_secs: u64 = parse_value(
        "REQUEST_TIMEOUT",
        &raw_or("REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS.to_string()),
    )?;
    let max_retries: u32 = parse_value(
        "MAX_RETRIES",
        &raw_or("MAX_RETRIES", DEFAULT_MAX_RETRIES.to_string()),
    )?;
    let delay_secs: f64 = parse_value(
        "DELAY_BETWEEN_REQUESTS",
        &raw_or("DELAY_BETWEEN_REQUESTS", DEFAULT_DELAY_SECS.to_string()),
    )?;

    let rotate_user_agent = lookup("USER_AGENT_ROTATE")
        .map(|v| parse_flag(&v))
        .unwrap_or(true);
    let local_priority = lookup("LOCAL_PRIORITY")
        .map(|v| parse_flag(&v))
        .unwrap_or(true);
    let base_url = lookup("SITE_BASE_URL")
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let defaults = StorageConfig::default();
    let storage = StorageConfig {
        csv_directory: lookup("CSV_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or(defaults.csv_directory),
        csv_filename_template: lookup("CSV_FILENAME_TEMPLATE")
            .unwrap_or(defaults.csv_filename_template),
        database_path: lookup("DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path),
    };

    Ok(Config {
        scraper: ScraperConfig {
            request_timeout_secs,
            max_retries,
            delay_secs,
            rotate_user_agent,
            base_url,
            local_priority,
        },
        storage,
    })
}

fn parse_value<T>(key: &str, raw: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("'{}': {}", raw, e),
    })
}

/// Only a case-insensitive `true` enables a flag
fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}
