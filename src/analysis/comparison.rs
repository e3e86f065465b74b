//! Comparison of a listing snapshot with an earlier one

use crate::analysis::stats::{price_statistics, PriceStatistics};
use crate::listing::ListingRecord;
use serde::Serialize;

/// Change between two snapshots of the same search
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceComparison {
    pub current_count: usize,
    pub previous_count: usize,
    pub count_change: i64,
    pub avg_price_change: f64,
    pub avg_price_change_percent: f64,
    pub median_price_change: f64,
    pub median_price_change_percent: f64,
    pub min_price_change: f64,
    pub max_price_change: f64,
}

/// Compares the current listings with an earlier snapshot
///
/// Returns `None` when either set is empty. Percent changes are zero when
/// the earlier value is not positive.
pub fn compare_with_previous(
    current: &[ListingRecord],
    previous: &[ListingRecord],
) -> Option<PriceComparison> {
    if current.is_empty() || previous.is_empty() {
        tracing::warn!("Not enough data to compare with previous listings");
        return None;
    }

    let now = price_statistics(current);
    let before = price_statistics(previous);
    Some(delta(&now, &before))
}

fn delta(now: &PriceStatistics, before: &PriceStatistics) -> PriceComparison {
    let avg_price_change = now.avg_price - before.avg_price;
    let median_price_change = now.median_price - before.median_price;

    PriceComparison {
        current_count: now.count,
        previous_count: before.count,
        count_change: now.count as i64 - before.count as i64,
        avg_price_change,
        avg_price_change_percent: percent_of(avg_price_change, before.avg_price),
        median_price_change,
        median_price_change_percent: percent_of(median_price_change, before.median_price),
        min_price_change: now.min_price - before.min_price,
        max_price_change: now.max_price - before.max_price,
    }
}

fn percent_of(change: f64, base: f64) -> f64 {
    if base > 0.0 {
        change / base * 100.0
    } else {
        0.0
    }
}
