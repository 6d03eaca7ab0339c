//! HTTP client for the catalog lookup service
//!
//! This module provides the client used to resolve Kinopoisk catalog ids.
//! It sends the API key header on every request and bounds each request by
//! a timeout. There is no retry: callers decide what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlayerError, Result};
use crate::parser::{parse_imdb_lookup, parse_keyword_search};
use crate::resolver::LookupService;
use crate::types::CatalogItem;

/// Base URL of the Kinopoisk unofficial API
pub const DEFAULT_BASE_URL: &str = "https://kinopoiskapiunofficial.tech";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-api-key";

const DEFAULT_USER_AGENT: &str = concat!("voiceplay/", env!("CARGO_PKG_VERSION"));

/// Path of the IMDb-id filter endpoint
const FILMS_PATH: &str = "/api/v2.2/films";

/// Path of the keyword search endpoint
const KEYWORD_SEARCH_PATH: &str = "/api/v2.1/films/search-by-keyword";

/// Configuration for the lookup HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Service base URL, without trailing slash (default: Kinopoisk unofficial API)
    pub base_url: String,
    /// API key sent in `X-API-KEY`; usually supplied via `VOICEPLAY_API_KEY`
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 5)
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// HTTP client for the catalog lookup service
///
/// # Example
/// ```no_run
/// use voiceplay_core::{ClientConfig, LookupClient};
///
/// # async fn example() -> Result<(), voiceplay_core::PlayerError> {
/// let client = LookupClient::with_config(ClientConfig {
///     api_key: Some("your-api-key".to_string()),
///     ..ClientConfig::default()
/// })?;
/// let films = client.search_by_keyword("Брат").await?;
/// println!("{} candidates", films.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LookupClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    /// Base URL without trailing slash
    base_url: String,
}

impl LookupClient {
    /// Create a client with default configuration (no API key).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration.
    ///
    /// # Errors
    /// - `PlayerError::InvalidConfig` if the API key is not a valid header value
    /// - `PlayerError::InvalidUrl` if the base URL does not parse
    /// - `PlayerError::HttpError` if the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| PlayerError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = config.api_key.as_deref() {
            let mut value = HeaderValue::from_str(key)
                .map_err(|_| PlayerError::InvalidConfig("API key is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a JSON body from a service path.
    ///
    /// # Errors
    /// - `PlayerError::NotFound` - Server returned 404
    /// - `PlayerError::Unauthorized` - Server returned 401 or 403
    /// - `PlayerError::RateLimited` - Server returned 429
    /// - `PlayerError::HttpError` - Network error or any other failing status
    pub async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "lookup request");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.text().await?);
        }

        match status {
            reqwest::StatusCode::NOT_FOUND => Err(PlayerError::NotFound(url)),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(PlayerError::Unauthorized)
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(PlayerError::RateLimited),
            _ => match response.error_for_status() {
                Err(e) => Err(PlayerError::HttpError(e)),
                Ok(_) => Err(PlayerError::ParseError(format!(
                    "unexpected status {status} from {url}"
                ))),
            },
        }
    }

    /// Look up catalog entries by IMDb id.
    ///
    /// # Errors
    /// `PlayerError::InvalidUrl` if `imdb_id` is blank, otherwise see [`Self::fetch`].
    pub async fn films_by_imdb_id(&self, imdb_id: &str) -> Result<Vec<CatalogItem>> {
        let imdb_id = imdb_id.trim();
        if imdb_id.is_empty() {
            return Err(PlayerError::InvalidUrl("IMDb id cannot be empty".to_string()));
        }

        let body = self.fetch(FILMS_PATH, &[("imdbId", imdb_id)]).await?;
        parse_imdb_lookup(&body)
    }

    /// Search catalog entries by keyword; returns the first page.
    ///
    /// # Errors
    /// `PlayerError::InvalidUrl` if `keyword` is blank, otherwise see [`Self::fetch`].
    pub async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<CatalogItem>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(PlayerError::InvalidUrl("Search keyword cannot be empty".to_string()));
        }

        let body = self
            .fetch(KEYWORD_SEARCH_PATH, &[("keyword", keyword), ("page", "1")])
            .await?;
        parse_keyword_search(&body)
    }
}

#[async_trait]
impl LookupService for LookupClient {
    async fn films_by_imdb_id(&self, imdb_id: &str) -> Result<Vec<CatalogItem>> {
        LookupClient::films_by_imdb_id(self, imdb_id).await
    }

    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<CatalogItem>> {
        LookupClient::search_by_keyword(self, keyword).await
    }
}
