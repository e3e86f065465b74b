//! Summary statistics over listing prices

use crate::analysis::{mean_and_std, positive_prices};
use crate::listing::ListingRecord;
use serde::Serialize;

/// Descriptive statistics of a listing set
///
/// Price figures cover listings with a positive price only; listings with
/// the zero sentinel are counted in `zero_prices_count`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceStatistics {
    /// Total number of listings, priced or not
    pub count: usize,
    pub avg_price: f64,
    pub median_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Population standard deviation
    pub std_price: f64,
    pub zero_prices_count: usize,
}

/// Computes price statistics for a listing set
///
/// # Returns
///
/// * All zeros for empty input
/// * `count` and `zero_prices_count` equal to the input length, other
///   figures zero, when no listing has a price
/// * Otherwise the figures over the priced subset
///
/// # Example
///
/// ```
/// use avito_monitor::{price_statistics, ListingRecord};
///
/// let records: Vec<ListingRecord> = [100.0, 300.0, 0.0]
///     .iter()
///     .map(|&price| ListingRecord { price, ..Default::default() })
///     .collect();
///
/// let stats = price_statistics(&records);
/// assert_eq!(stats.count, 3);
/// assert_eq!(stats.avg_price, 200.0);
/// assert_eq!(stats.zero_prices_count, 1);
/// ```
pub fn price_statistics(records: &[ListingRecord]) -> PriceStatistics {
    if records.is_empty() {
        tracing::warn!("No listings to compute price statistics for");
        return PriceStatistics::default();
    }

    let mut prices = positive_prices(records);
    if prices.is_empty() {
        tracing::warn!("No listing has a price, statistics are zero");
        return PriceStatistics {
            count: records.len(),
            zero_prices_count: records.len(),
            ..PriceStatistics::default()
        };
    }

    prices.sort_by(f64::total_cmp);
    let (avg_price, std_price) = mean_and_std(&prices);

    PriceStatistics {
        count: records.len(),
        avg_price,
        median_price: median_of_sorted(&prices),
        min_price: prices[0],
        max_price: prices[prices.len() - 1],
        std_price,
        zero_prices_count: records.len() - prices.len(),
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
