//! Voiceplay Core Library
//!
//! This crate provides source selection for movie/TV playback through
//! third-party embed players.
//!
//! # Features
//! - Ordered, configurable catalog of embed providers built from URL templates
//! - Availability filtering of providers against the ids a title has
//! - Best-effort Kinopoisk catalog id resolution (IMDb id, then title search)
//! - Player selection state with safe cancellation on close

pub mod catalog;
pub mod client;
pub mod config;
pub mod embed;
pub mod error;
pub mod filter;
pub mod parser;
pub mod player;
pub mod resolver;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use catalog::{
    CatalogKind, EmbedBuilder, FnBuilder, ProviderDescriptor, SourceCatalog, TemplateBuilder,
    UrlVariant,
};
pub use client::{ClientConfig, LookupClient};
pub use config::{ProviderConfig, ResolverConfig, VariantConfig, VoiceplayConfig};
pub use embed::{EmbedFrame, FramePolicy};
pub use error::{PlayerError, Result};
pub use filter::{available_sources, AvailableSource};
pub use player::Player;
pub use resolver::{
    select_best_match, ByAlternateId, ByTitle, LookupService, ResolutionStrategy, Resolver,
};
pub use session::{IdentifierStatus, Phase, PlayerSession, PlayerView};
pub use types::{CatalogItem, IdField, MediaKind, MediaReference, Resolution};
