//! Parsers for lookup service responses and search keywords
//!
//! This module contains:
//! - `lookup`: Parse the JSON bodies returned by the catalog lookup service
//! - `title`: Normalize display titles into search keywords

pub mod lookup;
pub mod title;

// Re-export main parsing functions
pub use lookup::{parse_imdb_lookup, parse_keyword_search};
pub use title::normalize_title;
