//! Lookup response parser
//!
//! Parses the two JSON shapes served by the Kinopoisk unofficial API:
//! the IMDb-id filter (`{"items": [...]}`) and the keyword search
//! (`{"films": [...]}`). Missing or oddly-typed fields are tolerated and
//! surface as `None` on the resulting [`CatalogItem`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::{PlayerError, Result};
use crate::types::CatalogItem;

#[derive(Debug, Deserialize)]
struct ImdbLookupResponse {
    #[serde(default)]
    items: Vec<ImdbLookupItem>,
}

#[derive(Debug, Deserialize)]
struct ImdbLookupItem {
    #[serde(rename = "kinopoiskId", default)]
    kinopoisk_id: Value,
    #[serde(default)]
    year: Value,
    #[serde(rename = "type", default)]
    kind: Value,
}

#[derive(Debug, Deserialize)]
struct KeywordSearchResponse {
    #[serde(default)]
    films: Vec<KeywordSearchItem>,
}

#[derive(Debug, Deserialize)]
struct KeywordSearchItem {
    #[serde(rename = "filmId", default)]
    film_id: Value,
    #[serde(default)]
    year: Value,
    #[serde(rename = "type", default)]
    kind: Value,
}

/// Render a JSON scalar as a string.
///
/// Numbers and non-empty strings are kept; `null`, empty strings, `0`,
/// booleans and containers are treated as absent.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use voiceplay_core::parser::lookup::scalar_to_string;
///
/// assert_eq!(scalar_to_string(&json!(301)), Some("301".to_string()));
/// assert_eq!(scalar_to_string(&json!("1999")), Some("1999".to_string()));
/// assert_eq!(scalar_to_string(&json!(null)), None);
/// ```
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if n.as_u64() == Some(0) {
                None
            } else {
                Some(n.to_string())
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "null" {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

/// Parse the response of the IMDb-id filter endpoint.
///
/// # Arguments
/// * `body` - Raw JSON body
///
/// # Returns
/// * `Ok(Vec<CatalogItem>)` in response order (possibly empty)
/// * `Err(PlayerError::ParseError)` if the body is not valid JSON
pub fn parse_imdb_lookup(body: &str) -> Result<Vec<CatalogItem>> {
    let response: ImdbLookupResponse = serde_json::from_str(body)
        .map_err(|e| PlayerError::ParseError(format!("IMDb lookup: {e}")))?;

    Ok(response
        .items
        .into_iter()
        .map(|item| CatalogItem {
            id: scalar_to_string(&item.kinopoisk_id),
            year: scalar_to_string(&item.year),
            kind: scalar_to_string(&item.kind),
        })
        .collect())
}

/// Parse the response of the keyword search endpoint.
///
/// # Arguments
/// * `body` - Raw JSON body
///
/// # Returns
/// * `Ok(Vec<CatalogItem>)` in response order (possibly empty)
/// * `Err(PlayerError::ParseError)` if the body is not valid JSON
pub fn parse_keyword_search(body: &str) -> Result<Vec<CatalogItem>> {
    let response: KeywordSearchResponse = serde_json::from_str(body)
        .map_err(|e| PlayerError::ParseError(format!("keyword search: {e}")))?;

    Ok(response
        .films
        .into_iter()
        .map(|film| CatalogItem {
            id: scalar_to_string(&film.film_id),
            year: scalar_to_string(&film.year),
            kind: scalar_to_string(&film.kind),
        })
        .collect())
}
