//! Storage module for persisting listing snapshots
//!
//! This module handles:
//! - CSV snapshot files, one per run
//! - A SQLite listing table with upsert by identifier
//! - Selecting a backend by name

mod csv_storage;
mod schema;
mod sqlite;
mod traits;

pub use csv_storage::CsvStorage;
pub use sqlite::{SqliteStorage, DEFAULT_LOAD_LIMIT};
pub use traits::{LoadSelector, Storage, StorageError, StorageResult};

use crate::config::StorageConfig;
use crate::listing::ListingRecord;
use std::fmt;
use std::str::FromStr;

/// Storage backend names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Csv,
    Sqlite,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// A concrete storage backend chosen by [`StorageKind`]
pub enum StorageBackend {
    Csv(CsvStorage),
    Sqlite(SqliteStorage),
}

impl StorageBackend {
    /// Opens the backend of the given kind
    ///
    /// # Returns
    ///
    /// * `Ok(StorageBackend)` - Backend ready for use
    /// * `Err(StorageError)` - The database could not be opened
    pub fn open(kind: StorageKind, config: &StorageConfig) -> StorageResult<Self> {
        match kind {
            StorageKind::Csv => Ok(Self::Csv(CsvStorage::new(config))),
            StorageKind::Sqlite => Ok(Self::Sqlite(SqliteStorage::new(&config.database_path)?)),
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            Self::Csv(_) => StorageKind::Csv,
            Self::Sqlite(_) => StorageKind::Sqlite,
        }
    }

    /// Saves listings, reporting failure as `false`
    ///
    /// The cause of a failure is logged.
    pub fn save(&mut self, records: &[ListingRecord]) -> bool {
        match Storage::save(self, records) {
            Ok(()) => true,
            Err(StorageError::NothingToSave) => {
                tracing::warn!("No listings to save");
                false
            }
            Err(e) => {
                tracing::error!("Failed to save listings to {}: {}", self.kind(), e);
                false
            }
        }
    }

    pub fn load(&self, selector: &LoadSelector) -> StorageResult<Vec<ListingRecord>> {
        Storage::load(self, selector)
    }
}

impl Storage for StorageBackend {
    fn save(&mut self, records: &[ListingRecord]) -> StorageResult<()> {
        match self {
            Self::Csv(storage) => storage.save(records),
            Self::Sqlite(storage) => storage.save(records),
        }
    }

    fn load(&self, selector: &LoadSelector) -> StorageResult<Vec<ListingRecord>> {
        match self {
            Self::Csv(storage) => storage.load(selector),
            Self::Sqlite(storage) => storage.load(selector),
        }
    }
}
