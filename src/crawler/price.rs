//! Price extraction cascade
//!
//! Price markup is the least stable part of a listing. Four tiers are tried
//! in order of decreasing confidence and the first one that yields a
//! positive price wins:
//!
//! 1. Known price selectors, text stripped to digits and dots
//! 2. Price encodings found in the raw markup (attributes, inline JSON)
//! 3. A number in the visible text, optionally followed by a currency
//! 4. Nothing matched: the zero sentinel
//!
//! The patterns are heuristics, not a grammar. Tier 3 in particular may
//! pick up unrelated numbers (model years, sizes) when the price markup is
//! missing entirely.

use crate::crawler::extractor::{select_first, ExtractError};
use crate::listing::ListingRecord;
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

/// Selectors for the element holding the rendered price
const PRICE_SELECTORS: &[&str] = &[
    "[data-marker=\"item-price\"]",
    "[itemprop=\"price\"]",
    ".styles-module-root-_KFFt",
    ".price-text",
    "[class*=\"price\"]",
];

/// Serialized price forms seen in listing markup
static MARKUP_PRICE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"data-price="(\d+)""#,
        r#"price":"(\d+)""#,
        r#"price":(\d+)"#,
        r"price=(\d+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid price pattern"))
    .collect()
});

/// Digit groups possibly separated by spaces, optionally followed by a currency
static TEXT_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d[\d\s]*\d|\d+)[.,]?\d*\s*(руб|₽)?").expect("valid text price regex")
});

type PriceTier = fn(&ElementRef<'_>) -> Result<Option<f64>, ExtractError>;

const PRICE_TIERS: &[PriceTier] = &[price_from_selectors, price_from_markup, price_from_text];

/// Runs the cascade over a listing fragment
///
/// Returns `0.0` when no tier produced a price.
pub(crate) fn extract_price(fragment: &ElementRef<'_>) -> Result<f64, ExtractError> {
    for tier in PRICE_TIERS {
        if let Some(price) = tier(fragment)? {
            return Ok(price);
        }
    }
    Ok(0.0)
}

/// Tier 1: first element matching one of the known price selectors
///
/// Only the first matching element is considered; if its text does not
/// hold a number the tier yields nothing.
fn price_from_selectors(fragment: &ElementRef<'_>) -> Result<Option<f64>, ExtractError> {
    for css in PRICE_SELECTORS {
        if let Some(element) = select_first(fragment, css)? {
            let text: String = element.text().collect();
            return Ok(parse_price_text(&text));
        }
    }
    Ok(None)
}

/// Tier 2: price encodings in the serialized fragment
fn price_from_markup(fragment: &ElementRef<'_>) -> Result<Option<f64>, ExtractError> {
    Ok(find_markup_price(&fragment.html()))
}

/// Tier 3: a plausible price in the visible text
fn price_from_text(fragment: &ElementRef<'_>) -> Result<Option<f64>, ExtractError> {
    let text: String = fragment
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect();
    Ok(find_text_price(&text))
}

/// Keeps digits and dots only, then parses what is left
pub(crate) fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().ok().and_then(positive)
}

pub(crate) fn find_markup_price(markup: &str) -> Option<f64> {
    MARKUP_PRICE_RES.iter().find_map(|re| {
        re.captures(markup)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .and_then(positive)
    })
}

pub(crate) fn find_text_price(text: &str) -> Option<f64> {
    let caps = TEXT_PRICE_RE.captures(text)?;
    let digits: String = caps
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    digits.parse::<f64>().ok().and_then(positive)
}

fn positive(value: f64) -> Option<f64> {
    let value = ListingRecord::sanitize_price(value);
    (value > 0.0).then_some(value)
}
