//! Listing extraction from search result markup
//!
//! This module turns a fetched results page into listing records:
//! - Locating the listing fragments on the page
//! - Reading each field through an ordered list of fallback strategies
//! - Resolving root-relative links against the site origin
//! - Containing every failure at the record boundary
//!
//! Extraction of a single fragment never fails: missing markup degrades to
//! default values, and unexpected errors are recorded in the record's
//! `error` field.

use crate::crawler::price::extract_price;
use crate::listing::{ListingRecord, LOCATION_NOT_SPECIFIED, NO_TITLE};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Selector matching one advertisement on a results page
pub const LISTING_SELECTOR: &str = "[data-marker=\"item\"]";

/// Case-insensitive marker of delivery-service labels in location text
const DELIVERY_MARKER: &str = "доставка";

/// Errors raised while reading a listing fragment
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// One way of reading a field out of a listing fragment
type Strategy = fn(&ElementRef<'_>) -> Result<Option<String>, ExtractError>;

/// Listings found on one results page
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    /// Number of listing fragments present on the page
    pub fragment_count: usize,

    /// Extracted records, at most the number requested
    pub records: Vec<ListingRecord>,
}

/// Extracts listing records from a results page
///
/// # Arguments
///
/// * `html` - The page markup
/// * `base_url` - Site origin used to build absolute listing URLs
/// * `max_records` - Stop extracting after this many records
///
/// # Returns
///
/// * `Ok(PageExtraction)` - Fragment count and extracted records
/// * `Err(ExtractError)` - The listing selector itself could not be built
///
/// # Example
///
/// ```
/// use avito_monitor::crawler::parse_listing_page;
/// use url::Url;
///
/// let html = r#"<div data-marker="item" data-item-id="42"><h3 itemprop="name">Sofa</h3></div>"#;
/// let base = Url::parse("https://www.avito.ru").unwrap();
/// let page = parse_listing_page(html, &base, 10).unwrap();
/// assert_eq!(page.fragment_count, 1);
/// assert_eq!(page.records[0].id, "42");
/// ```
pub fn parse_listing_page(
    html: &str,
    base_url: &Url,
    max_records: usize,
) -> Result<PageExtraction, ExtractError> {
    let document = Html::parse_document(html);
    let selector = parse_selector(LISTING_SELECTOR)?;

    let fragments: Vec<ElementRef<'_>> = document.select(&selector).collect();
    let records = fragments
        .iter()
        .take(max_records)
        .map(|fragment| extract_listing(fragment, base_url))
        .collect();

    Ok(PageExtraction {
        fragment_count: fragments.len(),
        records,
    })
}

/// Extracts one record from a listing fragment
///
/// Never fails; see the module documentation.
pub fn extract_listing(fragment: &ElementRef<'_>, base_url: &Url) -> ListingRecord {
    match try_extract_listing(fragment, base_url) {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Failed to extract listing: {}", e);
            ListingRecord::failed(e.to_string())
        }
    }
}

fn try_extract_listing(
    fragment: &ElementRef<'_>,
    base_url: &Url,
) -> Result<ListingRecord, ExtractError> {
    let id = first_match(fragment, &[id_from_item_attr, id_from_element_id])?.unwrap_or_default();

    let title = first_match(
        fragment,
        &[title_from_itemprop, title_from_class, title_from_marker],
    )?
    .unwrap_or_else(|| NO_TITLE.to_string());

    let url = first_match(fragment, &[href_root_relative, href_from_itemprop])?
        .and_then(|href| resolve_listing_url(&href, base_url))
        .unwrap_or_default();

    let price = extract_price(fragment)?;
    if price == 0.0 {
        tracing::debug!("No price found for listing '{}'", id);
    }

    let date = select_text(fragment, "[data-marker=\"item-date\"]")?.unwrap_or_default();

    let location = extract_location(fragment)?;

    Ok(ListingRecord {
        id,
        title,
        url,
        price: ListingRecord::sanitize_price(price),
        date,
        location,
        error: None,
    })
}

/// Runs strategies in order and returns the first value produced
fn first_match(
    fragment: &ElementRef<'_>,
    strategies: &[Strategy],
) -> Result<Option<String>, ExtractError> {
    for strategy in strategies {
        if let Some(value) = strategy(fragment)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn id_from_item_attr(fragment: &ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    Ok(non_empty(fragment.value().attr("data-item-id")))
}

/// Element ids look like `i1234567890`
fn id_from_element_id(fragment: &ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    Ok(non_empty(
        fragment
            .value()
            .attr("id")
            .map(|id| id.strip_prefix('i').unwrap_or(id)),
    ))
}

fn title_from_itemprop(fragment: &ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    select_text(fragment, "[itemprop=\"name\"]")
}

fn title_from_class(fragment: &ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    select_text(fragment, ".title-root")
}

fn title_from_marker(fragment: &ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    select_text(fragment, "[data-marker=\"item-title\"]")
}

fn href_root_relative(fragment: &ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    select_attr(fragment, "a[href^=\"/\"]", "href")
}

fn href_from_itemprop(fragment: &ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    select_attr(fragment, "a[itemprop=\"url\"]", "href")
}

fn location_from_marker(fragment: &ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    select_text(fragment, "[data-marker=\"item-location\"]")
}

fn location_from_geo_class(fragment: &ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    select_text(fragment, "[class*=\"geo\"]")
}

/// Reads the location, skipping delivery-service labels
///
/// When the primary location text is a delivery label, an element whose
/// class mentions `location` is tried instead; if that is a delivery label
/// too, the location is reported as not specified.
fn extract_location(fragment: &ElementRef<'_>) -> Result<String, ExtractError> {
    let Some(location) =
        first_match(fragment, &[location_from_marker, location_from_geo_class])?
    else {
        return Ok(LOCATION_NOT_SPECIFIED.to_string());
    };

    if !is_delivery_label(&location) {
        return Ok(location);
    }

    match select_text(fragment, "[class*=\"location\"]")? {
        Some(alternate) if !is_delivery_label(&alternate) => Ok(alternate),
        _ => Ok(LOCATION_NOT_SPECIFIED.to_string()),
    }
}

fn is_delivery_label(text: &str) -> bool {
    text.to_lowercase().contains(DELIVERY_MARKER)
}

/// Builds an absolute listing URL from a link target
///
/// Paths starting with `/` always stay on the site origin, including
/// protocol-relative `//host/...` forms. Absolute http(s) links are kept as
/// they are and any other scheme gives no URL.
fn resolve_listing_url(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let joined = if href.starts_with('/') {
        base_url.join(&format!("/{}", href.trim_start_matches('/')))
    } else {
        base_url.join(href)
    };

    match joined {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// First descendant of the fragment matching `css`
pub(crate) fn select_first<'a>(
    fragment: &ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let selector = parse_selector(css)?;
    Ok(fragment.select(&selector).next())
}

/// Trimmed text of the first descendant matching `css`, if non-empty
fn select_text(fragment: &ElementRef<'_>, css: &str) -> Result<Option<String>, ExtractError> {
    Ok(select_first(fragment, css)?
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty()))
}

/// Attribute of the first descendant matching `css`, if non-empty
fn select_attr(
    fragment: &ElementRef<'_>,
    css: &str,
    attr: &str,
) -> Result<Option<String>, ExtractError> {
    Ok(non_empty(
        select_first(fragment, css)?.and_then(|element| element.value().attr(attr)),
    ))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
