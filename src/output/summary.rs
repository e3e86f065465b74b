//! Text summary generation
//!
//! This module renders a human-readable report of a listing set, including
//! price statistics, the most common locations, the change since an
//! earlier snapshot, and price anomalies.

use crate::analysis::{
    compare_with_previous, find_outliers, location_distribution, price_statistics,
    DEFAULT_Z_THRESHOLD,
};
use crate::listing::ListingRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Returned instead of a report when there are no listings
pub const NO_DATA_MESSAGE: &str = "No data to analyze";

/// Locations listed in the report
const TOP_LOCATIONS: usize = 5;

/// Outliers listed in the report, the rest are only counted
const SHOWN_OUTLIERS: usize = 3;

/// Renders the summary report of a listing set
///
/// # Arguments
///
/// * `records` - The listings to report on
/// * `previous` - An earlier snapshot to compare against, if any
///
/// # Returns
///
/// The report text, or [`NO_DATA_MESSAGE`] for an empty listing set
pub fn generate_summary(
    records: &[ListingRecord],
    previous: Option<&[ListingRecord]>,
) -> String {
    if records.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }

    let stats = price_statistics(records);
    let mut lines: Vec<String> = Vec::new();

    lines.push("=== AVITO LISTINGS SUMMARY ===".to_string());
    lines.push(format!("Total listings: {}", stats.count));
    lines.push(format!("Average price: {:.2} RUB", stats.avg_price));
    lines.push(format!("Median price: {:.2} RUB", stats.median_price));
    lines.push(format!("Minimum price: {:.2} RUB", stats.min_price));
    lines.push(format!("Maximum price: {:.2} RUB", stats.max_price));
    lines.push(format!("Standard deviation: {:.2} RUB", stats.std_price));
    if stats.zero_prices_count > 0 {
        lines.push(format!("Listings without price: {}", stats.zero_prices_count));
    }

    let locations = location_distribution(records, TOP_LOCATIONS);
    if !locations.is_empty() {
        lines.push(String::new());
        lines.push(format!("Locations (top {}):", TOP_LOCATIONS));
        for (location, count) in &locations {
            lines.push(format!("- {}: {} listings", location, count));
        }
    }

    let comparison = previous.and_then(|previous| compare_with_previous(records, previous));
    if let Some(comparison) = comparison {
        lines.push(String::new());
        lines.push("Compared with previous data:".to_string());
        lines.push(format!("Listing count change: {}", comparison.count_change));
        lines.push(format!(
            "Average price change: {:.2} RUB ({:.2}%)",
            comparison.avg_price_change, comparison.avg_price_change_percent
        ));
        lines.push(format!(
            "Median price change: {:.2} RUB ({:.2}%)",
            comparison.median_price_change, comparison.median_price_change_percent
        ));
    }

    let outliers = find_outliers(records, DEFAULT_Z_THRESHOLD);
    if !outliers.is_empty() {
        lines.push(String::new());
        lines.push(format!("Found {} price anomalies:", outliers.len()));
        for (i, outlier) in outliers.iter().take(SHOWN_OUTLIERS).enumerate() {
            lines.push(format!("{}. {} - {:.2} RUB", i + 1, outlier.title, outlier.price));
        }
        if outliers.len() > SHOWN_OUTLIERS {
            lines.push(format!("... and {} more", outliers.len() - SHOWN_OUTLIERS));
        }
    }

    lines.join("\n")
}

/// Writes a rendered summary to a file, creating parent directories
pub fn write_summary(summary: &str, output_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(output_path)?;
    file.write_all(summary.as_bytes())?;
    file.write_all(b"\n")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn listing(title: &str, price: f64, location: &str) -> ListingRecord {
        ListingRecord {
            title: title.to_string(),
            price,
            location: location.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(generate_summary(&[], None), NO_DATA_MESSAGE);
    }

    #[test]
    fn test_summary_contains_statistics() {
        let records = vec![
            listing("Диван", 1000.0, "Москва"),
            listing("Кресло", 3000.0, "Москва"),
            listing("Стул", 0.0, "Тула"),
        ];
        let summary = generate_summary(&records, None);

        assert!(summary.starts_with("=== AVITO LISTINGS SUMMARY ==="));
        assert!(summary.contains("Total listings: 3"));
        assert!(summary.contains("Average price: 2000.00 RUB"));
        assert!(summary.contains("Median price: 2000.00 RUB"));
        assert!(summary.contains("Minimum price: 1000.00 RUB"));
        assert!(summary.contains("Maximum price: 3000.00 RUB"));
        assert!(summary.contains("Standard deviation: 1000.00 RUB"));
        assert!(summary.contains("Listings without price: 1"));
        assert!(summary.contains("- Москва: 2 listings\n- Тула: 1 listings"));
        assert!(!summary.contains("Compared with previous data"));
        assert!(!summary.contains("price anomalies"));
    }

    #[test]
    fn test_zero_price_line_omitted_when_all_priced() {
        let records = vec![listing("Диван", 1000.0, "Москва")];
        assert!(!generate_summary(&records, None).contains("without price"));
    }

    #[test]
    fn test_only_top_five_locations() {
        let records: Vec<_> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|loc| listing("x", 10.0, loc))
            .collect();
        let summary = generate_summary(&records, None);
        assert!(summary.contains("- E: 1 listings"));
        assert!(!summary.contains("- F: 1 listings"));
    }

    #[test]
    fn test_comparison_block() {
        let current = vec![listing("a", 150.0, ""), listing("b", 250.0, "")];
        let previous = vec![listing("a", 100.0, ""), listing("b", 100.0, "")];
        let summary = generate_summary(&current, Some(&previous));

        assert!(summary.contains("Compared with previous data:"));
        assert!(summary.contains("Listing count change: 0"));
        assert!(summary.contains("Average price change: 100.00 RUB (100.00%)"));
        assert!(summary.contains("Median price change: 100.00 RUB (100.00%)"));
    }

    #[test]
    fn test_empty_previous_skips_comparison() {
        let current = vec![listing("a", 150.0, "")];
        let summary = generate_summary(&current, Some(&[]));
        assert!(!summary.contains("Compared with previous data"));
    }

    #[test]
    fn test_outliers_truncated() {
        let mut records: Vec<_> = (0..20).map(|_| listing("обычный", 100.0, "")).collect();
        for i in 0..4 {
            records.push(listing(&format!("дорогой {i}"), 100_000.0, ""));
        }
        let summary = generate_summary(&records, None);

        assert!(summary.contains("Found 4 price anomalies:"));
        assert!(summary.contains("1. дорогой 0 - 100000.00 RUB"));
        assert!(summary.contains("3. дорогой 2 - 100000.00 RUB"));
        assert!(!summary.contains("дорогой 3 -"));
        assert!(summary.contains("... and 1 more"));
    }

    #[test]
    fn test_write_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join("summary.txt");

        write_summary("Total listings: 1", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Total listings: 1\n");
    }
}
