//! Configuration module for Avito-Monitor
//!
//! Settings come from a flat `KEY=value` file (dotenv format) overlaid by the
//! process environment. Every key has a documented default, so an empty
//! environment yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use avito_monitor::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("config.env"))).unwrap();
//! println!("Retries per page: {}", config.scraper.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ScraperConfig, StorageConfig, DEFAULT_BASE_URL, DEFAULT_DELAY_SECS,
    DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_DELAY_SECS,
};

// Re-export parser functions
pub use parser::{load_config, read_env_file};
pub use validation::validate;
