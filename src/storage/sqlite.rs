//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! Listings are upserted by identifier, so a listing seen again on a later
//! run replaces its earlier row and gets a fresh `parsed_at` stamp.

use crate::listing::ListingRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{LoadSelector, Storage, StorageError, StorageResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// Rows returned by a load without an explicit limit
pub const DEFAULT_LOAD_LIMIT: usize = 1000;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the listing database
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of stored listings
    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Storage for SqliteStorage {
    fn save(&mut self, records: &[ListingRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Err(StorageError::NothingToSave);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO listings (id, title, url, price, date, location)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    url = excluded.url,
                    price = excluded.price,
                    date = excluded.date,
                    location = excluded.location,
                    parsed_at = CURRENT_TIMESTAMP",
            )?;

            for record in records {
                stmt.execute(params![
                    record.id,
                    record.title,
                    record.url,
                    record.price,
                    record.date,
                    record.location,
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!("Saved {} listings to SQLite", records.len());
        Ok(())
    }

    fn load(&self, selector: &LoadSelector) -> StorageResult<Vec<ListingRecord>> {
        if let Some(name) = &selector.file_name {
            tracing::debug!("SQLite storage ignores file selector '{}'", name);
        }
        let limit = selector.limit.unwrap_or(DEFAULT_LOAD_LIMIT);

        let mut stmt = self.conn.prepare(
            "SELECT id, title, url, price, date, location FROM listings
             ORDER BY parsed_at DESC, rowid DESC
             LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![limit as i64], |row| {
                Ok(ListingRecord {
                    id: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    url: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    price: ListingRecord::sanitize_price(
                        row.get::<_, Option<f64>>(3)?.unwrap_or_default(),
                    ),
                    date: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    location: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    error: None,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Loaded {} listings from SQLite", records.len());
        Ok(records)
    }
}
