//! CSV storage implementation
//!
//! Each save writes a new snapshot file named from the configured template.
//! Files are UTF-8 with a byte order mark and use a comma as the decimal
//! separator of the price column, so they open directly in spreadsheet
//! software with a Russian locale.

use crate::config::StorageConfig;
use crate::listing::ListingRecord;
use crate::storage::traits::{LoadSelector, Storage, StorageError, StorageResult};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Placeholder in the filename template replaced by the save timestamp
const DATE_PLACEHOLDER: &str = "{date}";

const DATE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Column layout of a snapshot file
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    url: String,
}

impl From<&ListingRecord> for CsvRow {
    fn from(record: &ListingRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            price: format_price(record.price),
            date: record.date.clone(),
            location: record.location.clone(),
            url: record.url.clone(),
        }
    }
}

impl From<CsvRow> for ListingRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            url: row.url,
            price: parse_price(&row.price),
            date: row.date,
            location: row.location,
            error: None,
        }
    }
}

/// Writes a price with a comma decimal separator, e.g. `1500,0`
fn format_price(price: f64) -> String {
    let text = if price.fract() == 0.0 {
        format!("{:.1}", price)
    } else {
        price.to_string()
    };
    text.replace('.', ",")
}

/// Reads a price written with either decimal separator
fn parse_price(text: &str) -> f64 {
    let normalized: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    ListingRecord::sanitize_price(normalized.parse::<f64>().unwrap_or(0.0))
}

/// CSV snapshot storage backend
pub struct CsvStorage {
    directory: PathBuf,
    filename_template: String,
}

impl CsvStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            directory: config.csv_directory.clone(),
            filename_template: config.csv_filename_template.clone(),
        }
    }

    /// Saves listings under an explicit file name inside the directory
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written file
    /// * `Err(StorageError)` - Nothing to save or the file could not be written
    pub fn save_as(&self, records: &[ListingRecord], file_name: &str) -> StorageResult<PathBuf> {
        if records.is_empty() {
            return Err(StorageError::NothingToSave);
        }

        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(file_name);

        let mut file = File::create(&path)?;
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(file);
        for record in records {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;

        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        tracing::info!(
            "Saved {} listings to {} ({} bytes)",
            records.len(),
            path.display(),
            size
        );

        Ok(path)
    }

    /// File name for a snapshot taken now
    pub fn snapshot_file_name(&self) -> String {
        let stamp = Local::now().format(DATE_FORMAT).to_string();
        self.filename_template.replace(DATE_PLACEHOLDER, &stamp)
    }

    /// The snapshot file with the greatest name, if any
    ///
    /// With a timestamped template the greatest name is the newest file.
    pub fn latest_file(&self) -> StorageResult<Option<PathBuf>> {
        if !self.directory.is_dir() {
            return Ok(None);
        }

        let mut latest: Option<PathBuf> = None;
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            let is_csv = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            let newer = latest
                .as_ref()
                .map_or(true, |best| path.file_name() > best.file_name());
            if is_csv && newer {
                latest = Some(path);
            }
        }
        Ok(latest)
    }

    /// Reads all listings of a snapshot file
    pub fn read_file(path: &Path) -> StorageResult<Vec<ListingRecord>> {
        if !path.is_file() {
            return Err(StorageError::FileNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

        let mut reader = csv::Reader::from_reader(content);
        let records = reader
            .deserialize::<CsvRow>()
            .map(|row| row.map(ListingRecord::from))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Loaded {} listings from {}", records.len(), path.display());
        Ok(records)
    }
}

impl Storage for CsvStorage {
    fn save(&mut self, records: &[ListingRecord]) -> StorageResult<()> {
        let file_name = self.snapshot_file_name();
        self.save_as(records, &file_name)?;
        Ok(())
    }

    fn load(&self, selector: &LoadSelector) -> StorageResult<Vec<ListingRecord>> {
        let path = match &selector.file_name {
            Some(name) => self.directory.join(name),
            None => match self.latest_file()? {
                Some(path) => path,
                None => {
                    tracing::warn!("No CSV files found in {}", self.directory.display());
                    return Ok(Vec::new());
                }
            },
        };

        let mut records = Self::read_file(&path)?;
        if let Some(limit) = selector.limit {
            records.truncate(limit);
        }
        Ok(records)
    }
}
