//! Player selection state
//!
//! [`PlayerSession`] is the synchronous state machine behind one opened
//! player: which sources are available, which one is active, whether its
//! content is loading or failed, and where catalog id resolution stands.
//!
//! ```text
//! mount ──► ResolvingIdentifier ──complete──► Ready ◄──loaded/failed── Switching
//!   │                                          │  ▲                       ▲
//!   └──(no resolver)──────────────────────────►┘  └───────select──────────┘
//! any state ──close──► Closed
//! ```
//!
//! Every resolution run carries a generation number. Completions from an
//! older generation, or arriving after [`PlayerSession::close`], are dropped.

use serde::Serialize;
use tracing::debug;

use crate::catalog::SourceCatalog;
use crate::embed::EmbedFrame;
use crate::error::{PlayerError, Result};
use crate::filter::{available_sources, AvailableSource};
use crate::types::{MediaKind, MediaReference, Resolution};

/// Lifecycle phase of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the catalog id lookup
    ResolvingIdentifier,
    /// Sources are listed and one is active
    Ready,
    /// The user picked another source and its content has not reported yet
    Switching,
    /// Player was dismissed; terminal
    Closed,
}

/// Catalog id panel shown under the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdentifierStatus {
    /// This player does not resolve a catalog id
    NotApplicable,
    /// Catalog id known
    Found { catalog_id: String },
    /// Lookup found nothing; informational, with a retry affordance
    NotFound,
}

/// What a host should render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PlayerView {
    /// Catalog id lookup in progress
    Searching { title: String },
    /// No provider can play this title; only dismissal is offered
    Unavailable {
        title: String,
        tmdb_id: Option<String>,
        imdb_id: Option<String>,
        kinopoisk_id: Option<String>,
        catalog_page_url: Option<String>,
    },
    /// Sources available, one active
    Playing {
        title: String,
        kind: MediaKind,
        sources: Vec<AvailableSource>,
        selected: usize,
        frame: EmbedFrame,
        loading: bool,
        error: bool,
        identifier: IdentifierStatus,
        /// Kinopoisk title page, when the catalog id is known
        catalog_page_url: Option<String>,
    },
    /// Player was dismissed
    Closed,
}

/// State of one opened player
#[derive(Debug, Clone)]
pub struct PlayerSession {
    reference: MediaReference,
    catalog: SourceCatalog,
    resolves_catalog_id: bool,
    phase: Phase,
    resolution: Option<Resolution>,
    sources: Vec<AvailableSource>,
    selected: usize,
    loading: bool,
    error: bool,
    generation: u64,
    in_flight: bool,
}

impl PlayerSession {
    /// Open a player for `reference` over `catalog`.
    ///
    /// With `resolves_catalog_id`, the session starts in
    /// [`Phase::ResolvingIdentifier`] with generation 1 in flight; the caller
    /// runs the lookup and reports back through [`Self::complete_resolution`].
    /// Otherwise it starts [`Phase::Ready`] on source 0.
    pub fn mount(
        reference: MediaReference,
        catalog: SourceCatalog,
        resolves_catalog_id: bool,
    ) -> Self {
        let mut session = Self {
            reference,
            catalog,
            resolves_catalog_id,
            phase: Phase::Ready,
            resolution: None,
            sources: Vec::new(),
            selected: 0,
            loading: true,
            error: false,
            generation: 0,
            in_flight: false,
        };

        if resolves_catalog_id {
            session.phase = Phase::ResolvingIdentifier;
            session.generation = 1;
            session.in_flight = true;
        } else {
            session.refresh_sources();
        }
        session
    }

    /// Reference with the resolved catalog id applied, if any.
    pub fn effective_reference(&self) -> MediaReference {
        match self.resolution.as_ref().and_then(|r| r.catalog_id.clone()) {
            Some(id) => self.reference.clone().with_catalog_id(id),
            None => self.reference.clone(),
        }
    }

    /// Reference as mounted.
    pub fn reference(&self) -> &MediaReference {
        &self.reference
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn sources(&self) -> &[AvailableSource] {
        &self.sources
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Generation of the most recent resolution run.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_resolving(&self) -> bool {
        self.in_flight
    }

    /// Active source, if any.
    pub fn current(&self) -> Option<&AvailableSource> {
        self.sources.get(self.selected)
    }

    fn refresh_sources(&mut self) {
        self.sources = available_sources(&self.catalog, &self.effective_reference());
        self.reset_selection(0);
    }

    fn reset_selection(&mut self, index: usize) {
        self.selected = index;
        self.loading = true;
        self.error = false;
    }

    /// Start another run of catalog id resolution, as a manual retry.
    ///
    /// Returns the new generation, or `None` if this player does not
    /// resolve ids, a resolution is already in flight, or it is closed.
    pub fn begin_resolution(&mut self) -> Option<u64> {
        if !self.resolves_catalog_id || self.in_flight || self.phase == Phase::Closed {
            return None;
        }
        self.generation += 1;
        self.in_flight = true;
        self.phase = Phase::ResolvingIdentifier;
        Some(self.generation)
    }

    /// Apply a finished resolution.
    ///
    /// Returns `false` and leaves the state untouched when the result belongs
    /// to a superseded generation or the player is closed.
    pub fn complete_resolution(&mut self, generation: u64, resolution: Resolution) -> bool {
        if self.phase == Phase::Closed || !self.in_flight || generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                phase = ?self.phase,
                "dropping stale resolution"
            );
            return false;
        }

        self.in_flight = false;
        self.resolution = Some(resolution);
        self.phase = Phase::Ready;
        self.refresh_sources();
        true
    }

    /// Switch to the source at `index` of the available list.
    ///
    /// Resets `loading` to true and `error` to false, whatever they were.
    ///
    /// # Errors
    /// - `PlayerError::Closed` after [`Self::close`]
    /// - `PlayerError::NotReady` while resolving
    /// - `PlayerError::SourceOutOfRange` if `index` is past the list
    pub fn select(&mut self, index: usize) -> Result<()> {
        match self.phase {
            Phase::Closed => return Err(PlayerError::Closed),
            Phase::ResolvingIdentifier => return Err(PlayerError::NotReady),
            Phase::Ready | Phase::Switching => {}
        }
        if index >= self.sources.len() {
            return Err(PlayerError::SourceOutOfRange {
                index,
                available: self.sources.len(),
            });
        }

        self.reset_selection(index);
        self.phase = Phase::Switching;
        Ok(())
    }

    /// The active source's content finished loading.
    pub fn content_loaded(&mut self) {
        if matches!(self.phase, Phase::Ready | Phase::Switching) {
            self.loading = false;
            self.phase = Phase::Ready;
        }
    }

    /// The active source's content failed to load. The user may pick another
    /// source; nothing advances automatically.
    pub fn content_failed(&mut self) {
        if matches!(self.phase, Phase::Ready | Phase::Switching) {
            self.loading = false;
            self.error = true;
            self.phase = Phase::Ready;
        }
    }

    /// Dismiss the player. Terminal; later events are ignored.
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
        self.in_flight = false;
    }

    fn identifier_status(&self) -> IdentifierStatus {
        if !self.resolves_catalog_id {
            return IdentifierStatus::NotApplicable;
        }
        match self.resolution.as_ref().and_then(|r| r.catalog_id.clone()) {
            Some(catalog_id) => IdentifierStatus::Found { catalog_id },
            None => IdentifierStatus::NotFound,
        }
    }

    /// What a host should render right now.
    pub fn view(&self) -> PlayerView {
        match self.phase {
            Phase::Closed => PlayerView::Closed,
            Phase::ResolvingIdentifier => PlayerView::Searching {
                title: self.reference.title.clone(),
            },
            Phase::Ready | Phase::Switching => {
                let effective = self.effective_reference();
                let catalog_page_url = effective.catalog_page_url();
                match self.current() {
                    None => PlayerView::Unavailable {
                        title: effective.title,
                        tmdb_id: effective.tmdb_id,
                        imdb_id: effective.imdb_id,
                        kinopoisk_id: effective.kinopoisk_id,
                        catalog_page_url,
                    },
                    Some(source) => PlayerView::Playing {
                        title: self.reference.title.clone(),
                        kind: self.reference.media_kind(),
                        sources: self.sources.clone(),
                        selected: self.selected,
                        frame: EmbedFrame::for_source(
                            self.selected,
                            source,
                            self.catalog.frame_policy(),
                        ),
                        loading: self.loading,
                        error: self.error,
                        identifier: self.identifier_status(),
                        catalog_page_url,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> MediaReference {
        MediaReference::new("The Matrix", MediaKind::Movie)
            .with_tmdb_id("603")
            .with_imdb_id("tt0133093")
            .with_year(1999)
    }

    fn multi_session() -> PlayerSession {
        PlayerSession::mount(matrix(), SourceCatalog::multi_source().unwrap(), false)
    }

    fn voice_session() -> PlayerSession {
        PlayerSession::mount(matrix(), SourceCatalog::voice_over().unwrap(), true)
    }

    #[test]
    fn test_mount_without_resolver_is_ready_on_first_source() {
        let session = multi_session();

        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.selected(), 0);
        assert!(session.is_loading());
        assert!(!session.has_error());
        assert_eq!(session.sources().len(), 6);
        assert_eq!(session.current().unwrap().name, "VidSrc Pro");
    }

    #[test]
    fn test_mount_with_resolver_is_searching() {
        let session = voice_session();

        assert_eq!(session.phase(), Phase::ResolvingIdentifier);
        assert!(session.is_resolving());
        assert_eq!(session.generation(), 1);
        assert_eq!(
            session.view(),
            PlayerView::Searching {
                title: "The Matrix".to_string()
            }
        );
    }

    #[test]
    fn test_select_resets_flags_and_switches_url() {
        let mut session = multi_session();
        session.content_failed();
        assert!(session.has_error());
        assert!(!session.is_loading());

        session.select(2).unwrap();

        assert_eq!(session.phase(), Phase::Switching);
        assert!(session.is_loading());
        assert!(!session.has_error());
        assert_eq!(session.current().unwrap().url, "https://vidsrc.cc/v2/embed/movie/603");

        session.content_loaded();
        assert_eq!(session.phase(), Phase::Ready);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_select_same_index_still_resets() {
        let mut session = multi_session();
        session.content_loaded();
        session.select(0).unwrap();
        assert!(session.is_loading());
    }

    #[test]
    fn test_select_out_of_range() {
        let mut session = multi_session();
        let result = session.select(6);

        match result {
            Err(PlayerError::SourceOutOfRange { index, available }) => {
                assert_eq!(index, 6);
                assert_eq!(available, 6);
            }
            other => panic!("Expected SourceOutOfRange, got {:?}", other),
        }
        assert_eq!(session.selected(), 0);
    }

    #[test]
    fn test_select_while_resolving() {
        let mut session = voice_session();
        assert!(matches!(session.select(0), Err(PlayerError::NotReady)));
    }

    #[test]
    fn test_content_failure_stays_ready_without_advancing() {
        let mut session = multi_session();
        session.content_failed();

        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.selected(), 0);
        match session.view() {
            PlayerView::Playing { error, loading, .. } => {
                assert!(error);
                assert!(!loading);
            }
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_found_switches_to_catalog_url() {
        let mut session = voice_session();
        assert!(session.complete_resolution(1, Resolution::found("301")));

        assert_eq!(session.phase(), Phase::Ready);
        let names: Vec<_> = session.sources().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Collaps", "Kodik"]);
        assert_eq!(session.current().unwrap().url, "https://api.delivembd.ws/embed/kp/301");

        match session.view() {
            PlayerView::Playing { identifier, .. } => assert_eq!(
                identifier,
                IdentifierStatus::Found {
                    catalog_id: "301".to_string()
                }
            ),
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_source_frame_is_unsandboxed() {
        let reference = MediaReference::new("Dark", MediaKind::Series).with_tmdb_id("70523");
        let session = PlayerSession::mount(reference, SourceCatalog::multi_source().unwrap(), false);

        match session.view() {
            PlayerView::Playing { frame, .. } => {
                assert_eq!(frame.src, "https://vidsrc.pro/embed/tv/70523");
                assert_eq!(frame.sandbox, None);
                assert_eq!(frame.referrer_policy, None);
                assert!(!frame.allow.contains("fullscreen"));
                assert!(frame.allow_fullscreen);
                let html = frame.to_html();
                assert!(!html.contains("sandbox="));
                assert!(!html.contains("referrerpolicy"));
            }
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[test]
    fn test_voice_over_frame_is_sandboxed() {
        let mut session = voice_session();
        session.complete_resolution(1, Resolution::found("301"));

        match session.view() {
            PlayerView::Playing { frame, .. } => {
                assert_eq!(frame.sandbox.as_deref(), Some(crate::embed::VOICE_OVER_SANDBOX));
                assert_eq!(frame.referrer_policy.as_deref(), Some("origin"));
                assert!(frame.allow.ends_with("; fullscreen"));
            }
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_page_url_from_resolution() {
        let mut session = voice_session();
        session.complete_resolution(1, Resolution::found("301"));

        match session.view() {
            PlayerView::Playing {
                catalog_page_url, ..
            } => assert_eq!(
                catalog_page_url.as_deref(),
                Some("https://www.kinopoisk.ru/film/301/")
            ),
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_page_url_from_route_id() {
        let reference = matrix().with_tmdb_id("603").with_catalog_id("301");
        let session = PlayerSession::mount(reference, SourceCatalog::multi_source().unwrap(), false);

        match session.view() {
            PlayerView::Playing {
                catalog_page_url,
                identifier,
                ..
            } => {
                assert_eq!(identifier, IdentifierStatus::NotApplicable);
                assert_eq!(
                    catalog_page_url.as_deref(),
                    Some("https://www.kinopoisk.ru/film/301/")
                );
            }
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[test]
    fn test_no_catalog_page_url_without_id() {
        match multi_session().view() {
            PlayerView::Playing {
                catalog_page_url, ..
            } => assert_eq!(catalog_page_url, None),
            other => panic!("Expected Playing, got {:?}", other),
        }

        let mut session = voice_session();
        session.complete_resolution(1, Resolution::not_found());
        match session.view() {
            PlayerView::Playing {
                catalog_page_url, ..
            } => assert_eq!(catalog_page_url, None),
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_not_found_is_informational() {
        let mut session = voice_session();
        session.complete_resolution(1, Resolution::not_found());

        match session.view() {
            PlayerView::Playing {
                identifier,
                error,
                sources,
                ..
            } => {
                assert_eq!(identifier, IdentifierStatus::NotFound);
                assert!(!error);
                assert_eq!(sources.len(), 1);
                assert_eq!(sources[0].url, "https://api.delivembd.ws/embed/imdb/tt0133093");
            }
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_when_no_provider_fits() {
        let reference = MediaReference::new("Obscure", MediaKind::Movie);
        let mut session = PlayerSession::mount(reference, SourceCatalog::voice_over().unwrap(), true);
        session.complete_resolution(1, Resolution::not_found());

        assert_eq!(
            session.view(),
            PlayerView::Unavailable {
                title: "Obscure".to_string(),
                tmdb_id: None,
                imdb_id: None,
                kinopoisk_id: None,
                catalog_page_url: None,
            }
        );
    }

    #[test]
    fn test_retry_is_single_flight() {
        let mut session = voice_session();
        assert_eq!(session.begin_resolution(), None);

        session.complete_resolution(1, Resolution::not_found());
        assert_eq!(session.begin_resolution(), Some(2));
        assert_eq!(session.begin_resolution(), None);
        assert_eq!(session.phase(), Phase::ResolvingIdentifier);
    }

    #[test]
    fn test_retry_resets_selection() {
        let mut session = voice_session();
        session.complete_resolution(1, Resolution::found("301"));
        session.select(1).unwrap();
        session.content_failed();

        let generation = session.begin_resolution().unwrap();
        session.complete_resolution(generation, Resolution::found("301"));

        assert_eq!(session.selected(), 0);
        assert!(session.is_loading());
        assert!(!session.has_error());
    }

    #[test]
    fn test_retry_not_available_without_resolver() {
        let mut session = multi_session();
        assert_eq!(session.begin_resolution(), None);
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let mut session = voice_session();
        assert!(!session.complete_resolution(7, Resolution::found("1")));
        assert!(session.resolution().is_none());
        assert_eq!(session.phase(), Phase::ResolvingIdentifier);
    }

    #[test]
    fn test_no_writes_after_close() {
        let mut session = voice_session();
        session.close();

        assert!(!session.complete_resolution(1, Resolution::found("301")));
        assert!(session.resolution().is_none());
        assert_eq!(session.phase(), Phase::Closed);
        assert_eq!(session.view(), PlayerView::Closed);
        assert!(matches!(session.select(0), Err(PlayerError::Closed)));
        assert_eq!(session.begin_resolution(), None);

        session.content_loaded();
        assert_eq!(session.phase(), Phase::Closed);
    }

    #[test]
    fn test_view_serialization() {
        let view = PlayerView::Searching {
            title: "Dark".to_string(),
        };
        let json = serde_json::to_string(&view).unwrap();
        assert_eq!(json, r#"{"view":"searching","title":"Dark"}"#);

        let status = IdentifierStatus::Found {
            catalog_id: "301".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"status":"found","catalog_id":"301"}"#);
    }
}
