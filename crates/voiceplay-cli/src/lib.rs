//! Voiceplay host
//!
//! This crate plays the part of the detail page that opens a player: it
//! turns route-style parameters into a [`MediaReference`], owns the shared
//! lookup resolver, and exposes one function per host operation.
//!
//! # Commands
//! - `list_sources` - Providers available for a title
//! - `resolve_catalog_id` - Run catalog id resolution once
//! - `open_player` - Mount a player (resolving the catalog id when the
//!   catalog needs it)
//! - `play` - Open a player, wait for resolution, optionally switch source,
//!   return the view and close

pub mod cli;
pub mod commands;

use std::sync::Arc;

use voiceplay_core::{
    LookupClient, MediaKind, MediaReference, PlayerError, Resolver, VoiceplayConfig,
};

/// Shared state for host commands.
///
/// Holds the loaded configuration and a resolver over one lookup client,
/// shared by every player the host opens.
pub struct HostState {
    config: VoiceplayConfig,
    resolver: Arc<Resolver>,
}

impl HostState {
    /// Create host state from configuration.
    ///
    /// # Errors
    /// Returns an error if the lookup client cannot be created.
    pub fn new(config: VoiceplayConfig) -> Result<Self, PlayerError> {
        let lookup = Arc::new(LookupClient::with_config(config.lookup.clone())?);
        let resolver = Arc::new(Resolver::standard(lookup, config.resolver.step_timeout()));
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &VoiceplayConfig {
        &self.config
    }

    /// Resolver shared by all players.
    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }
}

/// Route-style parameters a detail page passes to the player.
#[derive(Debug, Clone, Default)]
pub struct RouteParams {
    /// `movie` or `tv`
    pub media_type: String,
    pub tmdb_id: Option<String>,
    pub imdb_id: Option<String>,
    pub kinopoisk_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<u32>,
}

impl RouteParams {
    /// Build the media reference for these parameters.
    ///
    /// # Errors
    /// `PlayerError::InvalidConfig` for an unknown media type.
    pub fn to_reference(&self) -> Result<MediaReference, PlayerError> {
        let kind: MediaKind = self.media_type.parse()?;
        let mut reference = MediaReference::new(self.title.clone().unwrap_or_default(), kind);
        if let Some(id) = &self.tmdb_id {
            reference = reference.with_tmdb_id(id.clone());
        }
        if let Some(id) = &self.imdb_id {
            reference = reference.with_imdb_id(id.clone());
        }
        if let Some(id) = &self.kinopoisk_id {
            reference = reference.with_catalog_id(id.clone());
        }
        if let Some(year) = self.year {
            reference = reference.with_year(year);
        }
        Ok(reference)
    }
}
