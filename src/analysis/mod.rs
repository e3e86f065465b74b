//! Price analysis over collected listings
//!
//! Every function here is total: empty input, listings without prices and
//! zero spread produce a documented degenerate result instead of an error.

mod comparison;
mod distribution;
mod outliers;
mod stats;

pub use comparison::{compare_with_previous, PriceComparison};
pub use distribution::{location_distribution, DEFAULT_LOCATION_LIMIT};
pub use outliers::{find_outliers, DEFAULT_Z_THRESHOLD};
pub use stats::{price_statistics, PriceStatistics};

/// Strictly positive prices of the given listings, in input order
pub(crate) fn positive_prices(records: &[crate::ListingRecord]) -> Vec<f64> {
    records
        .iter()
        .filter(|record| record.has_price())
        .map(|record| record.price)
        .collect()
}

/// Arithmetic mean and population standard deviation
///
/// Callers guarantee a non-empty slice.
pub(crate) fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
