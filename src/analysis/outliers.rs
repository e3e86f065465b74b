//! Z-score based detection of unusual prices

use crate::analysis::{mean_and_std, positive_prices};
use crate::listing::ListingRecord;

/// Z-score magnitude from which a price counts as an outlier
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// Finds listings whose price lies far from the rest
///
/// Only listings with a positive price take part. A listing is an outlier
/// when `|price - mean| / std >= z_threshold`, with the population standard
/// deviation of the priced listings. The comparison is inclusive for every
/// input: a price exactly at the threshold is reported.
///
/// When all priced listings share one price there is no spread and nothing
/// is an outlier, whatever the rounding of the computed deviation.
///
/// # Example
///
/// ```
/// use avito_monitor::{find_outliers, ListingRecord};
///
/// let records: Vec<ListingRecord> = [100.0, 100.0, 100.0, 100.0, 10000.0]
///     .iter()
///     .map(|&price| ListingRecord { price, ..Default::default() })
///     .collect();
///
/// let outliers = find_outliers(&records, 2.0);
/// assert_eq!(outliers.len(), 1);
/// assert_eq!(outliers[0].price, 10000.0);
/// ```
pub fn find_outliers(records: &[ListingRecord], z_threshold: f64) -> Vec<ListingRecord> {
    let prices = positive_prices(records);
    if prices.is_empty() {
        tracing::warn!("No priced listings to search for outliers");
        return Vec::new();
    }

    let (min, max) = prices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    let (mean, std) = mean_and_std(&prices);
    if min == max || std == 0.0 {
        tracing::warn!("Prices have no spread, no outliers can be found");
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| record.has_price())
        .filter(|record| ((record.price - mean) / std).abs() >= z_threshold)
        .cloned()
        .collect()
}
