//! Listing counts per location

use crate::listing::ListingRecord;
use std::collections::HashMap;

/// Number of locations reported when no limit is given
pub const DEFAULT_LOCATION_LIMIT: usize = 10;

/// Counts listings per location, most frequent first
///
/// Locations are trimmed and blank ones are skipped. Equal counts keep the
/// order in which the locations were first seen.
pub fn location_distribution(records: &[ListingRecord], limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let location = record.location.trim();
        if location.is_empty() {
            continue;
        }
        match index.get(location) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(location, counts.len());
                counts.push((location.to_string(), 1));
            }
        }
    }

    // stable: ties stay in encounter order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(locations: &[&str]) -> Vec<ListingRecord> {
        locations
            .iter()
            .map(|location| ListingRecord {
                location: location.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_blank_locations_skipped() {
        let distribution = location_distribution(&at(&["A", "A", "B", ""]), DEFAULT_LOCATION_LIMIT);
        assert_eq!(
            distribution,
            vec![("A".to_string(), 2), ("B".to_string(), 1)]
        );
    }

    #[test]
    fn test_locations_are_trimmed() {
        let distribution = location_distribution(&at(&[" Москва", "Москва ", "   "]), 10);
        assert_eq!(distribution, vec![("Москва".to_string(), 2)]);
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let records = at(&["Казань", "Сочи", "Омск", "Сочи", "Омск"]);
        let distribution = location_distribution(&records, 10);
        let names: Vec<_> = distribution.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Сочи", "Омск", "Казань"]);
    }

    #[test]
    fn test_limit_truncates() {
        let distribution = location_distribution(&at(&["A", "B", "C", "C"]), 2);
        assert_eq!(
            distribution,
            vec![("C".to_string(), 2), ("A".to_string(), 1)]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(location_distribution(&[], 10).is_empty());
    }
}
