//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::listing::ListingRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No listings to save")]
    NothingToSave,

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Which stored listings to load
///
/// Each backend honours the parts that apply to it: CSV storage reads a
/// single file, SQLite storage returns the most recent rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSelector {
    /// File to read; the newest file when `None`
    pub file_name: Option<String>,

    /// Maximum number of rows; the backend default when `None`
    pub limit: Option<usize>,
}

impl LoadSelector {
    /// The most recent data the backend holds
    pub fn latest() -> Self {
        Self::default()
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            file_name: Some(name.into()),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Trait for storage backend implementations
pub trait Storage {
    /// Persists a listing set
    ///
    /// # Returns
    ///
    /// * `Ok(())` - All listings were written
    /// * `Err(StorageError::NothingToSave)` - The listing set was empty
    /// * `Err(StorageError)` - The backend failed to write
    fn save(&mut self, records: &[ListingRecord]) -> StorageResult<()>;

    /// Loads previously saved listings
    fn load(&self, selector: &LoadSelector) -> StorageResult<Vec<ListingRecord>>;
}
