//! Data types for voiceplay
//!
//! This module contains the core data structures shared by the catalog,
//! the resolver and the player session. All types implement Serialize so
//! a host can forward them to a frontend unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlayerError;

/// Public title page on the Kinopoisk site
pub const CATALOG_PAGE_BASE: &str = "https://www.kinopoisk.ru/film";

/// Kind of title being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Feature film
    Movie,
    /// TV series, show or mini-series
    Series,
}

impl MediaKind {
    /// Parse the media kind from a detail-page route segment (`movie` or `tv`).
    ///
    /// # Examples
    /// ```
    /// use voiceplay_core::MediaKind;
    ///
    /// assert_eq!(MediaKind::from_route("tv"), Some(MediaKind::Series));
    /// assert_eq!(MediaKind::from_route("movie"), Some(MediaKind::Movie));
    /// assert_eq!(MediaKind::from_route("person"), None);
    /// ```
    pub fn from_route(segment: &str) -> Option<Self> {
        match segment.trim().to_ascii_lowercase().as_str() {
            "movie" => Some(Self::Movie),
            "tv" | "series" => Some(Self::Series),
            _ => None,
        }
    }

    /// Segment used in routes and embed URLs (`movie` or `tv`).
    pub fn route_segment(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "tv",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_segment())
    }
}

impl FromStr for MediaKind {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_route(s)
            .ok_or_else(|| PlayerError::InvalidConfig(format!("unknown media kind: {s}")))
    }
}

/// Identifiers and display data for a single title.
///
/// Created when a detail page opens the player and immutable for the
/// lifetime of that playback session, except for the catalog id which
/// may be filled in once by resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaReference {
    /// External database id (TMDB)
    pub tmdb_id: Option<String>,
    /// Alternate database id (IMDb)
    pub imdb_id: Option<String>,
    /// Catalog id (Kinopoisk), usually resolved asynchronously
    pub kinopoisk_id: Option<String>,
    /// Display title
    pub title: String,
    /// Release year
    pub year: Option<u32>,
    /// Movie or series
    pub kind: Option<MediaKind>,
}

impl MediaReference {
    /// Create a reference with a title and media kind and no ids.
    pub fn new(title: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            title: title.into(),
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_tmdb_id(mut self, id: impl Into<String>) -> Self {
        self.tmdb_id = non_empty(id.into());
        self
    }

    pub fn with_imdb_id(mut self, id: impl Into<String>) -> Self {
        self.imdb_id = non_empty(id.into());
        self
    }

    pub fn with_catalog_id(mut self, id: impl Into<String>) -> Self {
        self.kinopoisk_id = non_empty(id.into());
        self
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    /// Media kind, defaulting to movie when the host did not pass one.
    pub fn media_kind(&self) -> MediaKind {
        self.kind.unwrap_or(MediaKind::Movie)
    }

    /// Value of a template field, or `None` when it is missing or blank.
    pub fn field(&self, field: IdField) -> Option<String> {
        match field {
            IdField::Tmdb => self.tmdb_id.clone().and_then(non_empty),
            IdField::Imdb => self.imdb_id.clone().and_then(non_empty),
            IdField::Kinopoisk => self.kinopoisk_id.clone().and_then(non_empty),
            IdField::Title => non_empty(self.title.trim().to_string()),
            IdField::Year => self.year.map(|y| y.to_string()),
        }
    }

    /// Whether a template field is present.
    pub fn has(&self, field: IdField) -> bool {
        self.field(field).is_some()
    }

    /// Link to the title's Kinopoisk page, when the catalog id is known.
    pub fn catalog_page_url(&self) -> Option<String> {
        self.field(IdField::Kinopoisk)
            .map(|id| format!("{}/{}/", CATALOG_PAGE_BASE, id.trim()))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Field of a [`MediaReference`] an embed URL template can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdField {
    Tmdb,
    Imdb,
    Kinopoisk,
    Title,
    Year,
}

impl IdField {
    /// Placeholder name used in URL templates.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Tmdb => "tmdb_id",
            Self::Imdb => "imdb_id",
            Self::Kinopoisk => "kinopoisk_id",
            Self::Title => "title",
            Self::Year => "year",
        }
    }
}

/// One entry returned by the catalog lookup service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Catalog id (Kinopoisk film id)
    pub id: Option<String>,
    /// Release year as reported by the service (e.g., "1999" or "1999-2003")
    pub year: Option<String>,
    /// Kind label as reported by the service (e.g., "FILM", "TV_SERIES")
    pub kind: Option<String>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, year: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            year: Some(year.into()),
            kind: Some(kind.into()),
        }
    }
}

/// Outcome of catalog id resolution for one session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resolution {
    /// Resolved catalog id; `None` means "not found"
    pub catalog_id: Option<String>,
}

impl Resolution {
    pub fn found(id: impl Into<String>) -> Self {
        Self {
            catalog_id: Some(id.into()),
        }
    }

    pub fn not_found() -> Self {
        Self { catalog_id: None }
    }

    pub fn is_found(&self) -> bool {
        self.catalog_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_page_url() {
        let reference = MediaReference::new("Брат", MediaKind::Movie).with_catalog_id("41519");
        assert_eq!(
            reference.catalog_page_url().as_deref(),
            Some("https://www.kinopoisk.ru/film/41519/")
        );
        assert_eq!(MediaReference::new("Брат", MediaKind::Movie).catalog_page_url(), None);
    }

    #[test]
    fn test_media_kind_serialization() {
        let json = serde_json::to_string(&MediaKind::Series).unwrap();
        assert_eq!(json, "\"series\"");

        let kind: MediaKind = serde_json::from_str("\"movie\"").unwrap();
        assert_eq!(kind, MediaKind::Movie);
    }

    #[test]
    fn test_media_kind_route_segment() {
        assert_eq!(MediaKind::Movie.route_segment(), "movie");
        assert_eq!(MediaKind::Series.route_segment(), "tv");
        assert_eq!(MediaKind::Series.to_string(), "tv");
    }

    #[test]
    fn test_media_kind_from_str_rejects_unknown() {
        assert!("tv".parse::<MediaKind>().is_ok());
        assert!(matches!(
            "person".parse::<MediaKind>(),
            Err(PlayerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_reference_blank_ids_are_absent() {
        let reference = MediaReference::new("Matrix", MediaKind::Movie)
            .with_tmdb_id("")
            .with_imdb_id("   ");

        assert!(!reference.has(IdField::Tmdb));
        assert!(!reference.has(IdField::Imdb));
        assert!(reference.has(IdField::Title));
        assert!(!reference.has(IdField::Year));
    }

    #[test]
    fn test_reference_fields() {
        let reference = MediaReference::new("Matrix", MediaKind::Movie)
            .with_tmdb_id("603")
            .with_imdb_id("tt0133093")
            .with_year(1999);

        assert_eq!(reference.field(IdField::Tmdb).as_deref(), Some("603"));
        assert_eq!(reference.field(IdField::Imdb).as_deref(), Some("tt0133093"));
        assert_eq!(reference.field(IdField::Year).as_deref(), Some("1999"));
        assert_eq!(reference.field(IdField::Kinopoisk), None);
    }

    #[test]
    fn test_reference_without_kind_defaults_to_movie() {
        let reference = MediaReference::default();
        assert_eq!(reference.media_kind(), MediaKind::Movie);
    }

    #[test]
    fn test_resolution_states() {
        assert!(Resolution::found("301").is_found());
        assert!(!Resolution::not_found().is_found());
        assert_eq!(Resolution::default(), Resolution::not_found());
    }
}
