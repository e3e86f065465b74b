//! Database schema definitions
//!
//! This module contains the SQL schema of the listing database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per advertisement, refreshed on every save
CREATE TABLE IF NOT EXISTS listings (
    id TEXT PRIMARY KEY,
    title TEXT,
    url TEXT,
    price REAL,
    date TEXT,
    location TEXT,
    parsed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_listings_parsed_at ON listings(parsed_at);
"#;

/// Initializes the database schema
///
/// Safe to run against an existing database.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
