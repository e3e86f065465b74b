//! Listing record definitions
//!
//! A `ListingRecord` is the unit of extraction: one advertisement from a
//! search results page, reduced to the six fields the monitor tracks.

use serde::{Deserialize, Serialize};

/// Title used when no title markup could be found
pub const NO_TITLE: &str = "No title";

/// Location used when no usable location markup could be found
pub const LOCATION_NOT_SPECIFIED: &str = "Not specified";

/// One advertisement extracted from a search results page
///
/// `price` is always finite and non-negative. A price of `0.0` means the
/// price could not be determined, not that the item is free.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Marketplace identifier, empty if unrecoverable
    pub id: String,

    /// Advertisement title
    pub title: String,

    /// Absolute URL of the advertisement, empty if no link was found
    pub url: String,

    /// Price, `0.0` when unknown
    pub price: f64,

    /// Publication date exactly as rendered by the page
    pub date: String,

    /// Free-text location
    pub location: String,

    /// Diagnostic set only when extraction hit an unexpected condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ListingRecord {
    /// Creates the record returned when extraction of a fragment failed
    ///
    /// All core fields keep their empty defaults; the failure description
    /// is kept in `error`.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Returns true if a price was determined for this listing
    pub fn has_price(&self) -> bool {
        self.price > 0.0
    }

    /// Clamps the price into the finite non-negative range
    ///
    /// Anything that is not a finite positive number becomes the zero sentinel.
    pub(crate) fn sanitize_price(price: f64) -> f64 {
        if price.is_finite() && price > 0.0 {
            price
        } else {
            0.0
        }
    }
}
