//! Error types for voiceplay
//!
//! This module defines all error types used throughout the library.
//! PlayerError implements Serialize so hosts can hand it to a frontend as-is.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for voiceplay operations
#[derive(Error, Debug)]
pub enum PlayerError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to parse a lookup service response
    #[error("Failed to parse lookup response: {0}")]
    ParseError(String),

    /// Invalid URL or URL template
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Lookup service rejected the API key (HTTP 401/403)
    #[error("Lookup service rejected the API key")]
    Unauthorized,

    /// Rate limited by the lookup service (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Requested resource was not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A lookup step did not finish within its time bound
    #[error("Lookup timed out after {0} ms")]
    Timeout(u64),

    /// Configuration is malformed or inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Source index outside the available source list
    #[error("Source index {index} out of range (available: {available})")]
    SourceOutOfRange { index: usize, available: usize },

    /// Source switching attempted while the catalog id is still being resolved
    #[error("Player is still resolving the catalog id")]
    NotReady,

    /// Operation attempted on a player that was already closed
    #[error("Player is closed")]
    Closed,

    /// Filesystem error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize PlayerError as its display string
impl Serialize for PlayerError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for voiceplay operations
pub type Result<T> = std::result::Result<T, PlayerError>;
