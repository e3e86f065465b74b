//! Output module for rendering listing reports
//!
//! This module handles:
//! - Rendering the text summary of a listing set
//! - Writing the summary to a file

mod summary;

pub use summary::{generate_summary, write_summary, NO_DATA_MESSAGE};
