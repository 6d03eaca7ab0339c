//! Catalog id resolution
//!
//! Resolves a Kinopoisk catalog id for a [`MediaReference`] by running an
//! ordered list of strategies and stopping at the first one that produces an
//! id. Every strategy is best-effort: lookup errors, timeouts and empty
//! results are logged and read as "no id from this step", never surfaced.
//!
//! The standard pipeline is:
//! 1. [`ByAlternateId`] - filter the catalog by IMDb id, take the first hit.
//! 2. [`ByTitle`] - keyword search on the normalized title, then pick a
//!    candidate with [`select_best_match`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_STEP_TIMEOUT_SECS;
use crate::error::{PlayerError, Result};
use crate::parser::normalize_title;
use crate::types::{CatalogItem, IdField, MediaKind, MediaReference, Resolution};

/// Kind labels the lookup service uses for series-like titles.
const SERIES_KIND_LABELS: &[&str] = &["TV_SERIES", "TV_SHOW", "MINI_SERIES", "SERIES"];

/// Kind label the lookup service uses for films.
const FILM_KIND_LABEL: &str = "FILM";

/// Catalog lookup service queried during resolution.
#[async_trait]
pub trait LookupService: Send + Sync {
    /// Catalog entries whose IMDb id equals `imdb_id`.
    async fn films_by_imdb_id(&self, imdb_id: &str) -> Result<Vec<CatalogItem>>;

    /// First page of a free-text keyword search.
    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<CatalogItem>>;
}

/// One step of the resolution pipeline.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Try to produce a catalog id. Never fails: `None` means "nothing here".
    async fn resolve(&self, reference: &MediaReference) -> Option<String>;
}

/// Run a lookup call under a time bound, folding errors and timeouts into `None`.
async fn bounded<T, F>(step: &'static str, limit: Duration, call: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!(step, error = %e, "lookup failed");
            None
        }
        Err(_) => {
            let e = PlayerError::Timeout(limit.as_millis() as u64);
            warn!(step, error = %e, "lookup failed");
            None
        }
    }
}

/// Whether a service kind label matches the requested media kind.
///
/// Films match `FILM` or a missing label; series match any of the
/// series-like labels. Comparison ignores ASCII case.
///
/// # Examples
/// ```
/// use voiceplay_core::MediaKind;
/// use voiceplay_core::resolver::kind_matches;
///
/// assert!(kind_matches(Some("FILM"), MediaKind::Movie));
/// assert!(kind_matches(None, MediaKind::Movie));
/// assert!(kind_matches(Some("MINI_SERIES"), MediaKind::Series));
/// assert!(!kind_matches(None, MediaKind::Series));
/// ```
pub fn kind_matches(label: Option<&str>, kind: MediaKind) -> bool {
    match kind {
        MediaKind::Movie => label.map_or(true, |l| l.eq_ignore_ascii_case(FILM_KIND_LABEL)),
        MediaKind::Series => label.is_some_and(|l| {
            SERIES_KIND_LABELS
                .iter()
                .any(|series| l.eq_ignore_ascii_case(series))
        }),
    }
}

fn year_matches(item: &CatalogItem, year: Option<u32>) -> bool {
    match (year, item.year.as_deref()) {
        (Some(wanted), Some(found)) => found.trim() == wanted.to_string(),
        _ => false,
    }
}

/// Pick the candidate to take a catalog id from.
///
/// Scans `items` in their original order and returns, by priority:
/// 1. the first item matching both year and kind;
/// 2. else the first item matching kind;
/// 3. else the first item matching year;
/// 4. else the first item.
///
/// Returns `None` only for an empty slice. A requested year of `None`
/// never matches.
pub fn select_best_match(
    items: &[CatalogItem],
    kind: MediaKind,
    year: Option<u32>,
) -> Option<&CatalogItem> {
    let kind_ok = |item: &&CatalogItem| kind_matches(item.kind.as_deref(), kind);
    let year_ok = |item: &&CatalogItem| year_matches(item, year);

    items
        .iter()
        .find(|item| year_ok(item) && kind_ok(item))
        .or_else(|| items.iter().find(kind_ok))
        .or_else(|| items.iter().find(year_ok))
        .or_else(|| items.first())
}

/// Resolve through the IMDb-id filter endpoint.
pub struct ByAlternateId {
    lookup: Arc<dyn LookupService>,
    timeout: Duration,
}

impl ByAlternateId {
    pub fn new(lookup: Arc<dyn LookupService>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }
}

#[async_trait]
impl ResolutionStrategy for ByAlternateId {
    fn name(&self) -> &'static str {
        "imdb_id"
    }

    async fn resolve(&self, reference: &MediaReference) -> Option<String> {
        let imdb_id = reference.field(IdField::Imdb)?;
        let items = bounded(
            self.name(),
            self.timeout,
            self.lookup.films_by_imdb_id(&imdb_id),
        )
        .await?;

        let id = items.into_iter().next().and_then(|item| item.id);
        if id.is_none() {
            debug!(%imdb_id, "no catalog entry for IMDb id");
        }
        id
    }
}

/// Resolve through keyword search on the normalized title.
pub struct ByTitle {
    lookup: Arc<dyn LookupService>,
    timeout: Duration,
}

impl ByTitle {
    pub fn new(lookup: Arc<dyn LookupService>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }
}

#[async_trait]
impl ResolutionStrategy for ByTitle {
    fn name(&self) -> &'static str {
        "title"
    }

    async fn resolve(&self, reference: &MediaReference) -> Option<String> {
        let keyword = normalize_title(&reference.title);
        if keyword.is_empty() {
            debug!(title = %reference.title, "title has no searchable characters");
            return None;
        }

        let items = bounded(
            self.name(),
            self.timeout,
            self.lookup.search_by_keyword(&keyword),
        )
        .await?;

        let kind = reference.media_kind();
        let candidate = select_best_match(&items, kind, reference.year)?;
        debug!(
            %keyword,
            candidates = items.len(),
            kind = candidate.kind.as_deref().unwrap_or("-"),
            "picked title search candidate"
        );
        candidate.id.clone()
    }
}

/// Ordered, short-circuiting resolution pipeline
pub struct Resolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl Resolver {
    pub fn new(strategies: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    /// IMDb-id lookup followed by title search, each bounded by `step_timeout`.
    pub fn standard(lookup: Arc<dyn LookupService>, step_timeout: Duration) -> Self {
        Self::new(vec![
            Box::new(ByAlternateId::new(Arc::clone(&lookup), step_timeout)),
            Box::new(ByTitle::new(lookup, step_timeout)),
        ])
    }

    /// Standard pipeline with the default 5 second step timeout.
    pub fn with_lookup(lookup: Arc<dyn LookupService>) -> Self {
        Self::standard(lookup, Duration::from_secs(DEFAULT_STEP_TIMEOUT_SECS))
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the strategies in order until one yields an id.
    pub async fn resolve(&self, reference: &MediaReference) -> Resolution {
        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), title = %reference.title, "trying strategy");
            if let Some(id) = strategy.resolve(reference).await {
                info!(
                    strategy = strategy.name(),
                    catalog_id = %id,
                    title = %reference.title,
                    "resolved catalog id"
                );
                return Resolution::found(id);
            }
        }

        info!(title = %reference.title, year = ?reference.year, "catalog id not found");
        Resolution::not_found()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
