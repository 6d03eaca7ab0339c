//! Host commands
//!
//! One function per operation a host page performs on the player.

use std::sync::Arc;

use tracing::info;

use crate::HostState;
use voiceplay_core::{
    available_sources, AvailableSource, CatalogKind, MediaReference, Player, PlayerError,
    PlayerView, Resolution,
};

/// List the providers available for a title.
///
/// # Arguments
/// * `reference` - Title ids as passed by the detail page
/// * `catalog` - Built-in catalog to use when none is configured
///
/// # Returns
/// * `Ok(Vec<AvailableSource>)` in catalog order, possibly empty
/// * `Err(PlayerError::InvalidConfig)` if the configured catalog is invalid
pub fn list_sources(
    state: &HostState,
    reference: &MediaReference,
    catalog: CatalogKind,
) -> Result<Vec<AvailableSource>, PlayerError> {
    let catalog = state.config().catalog(catalog)?;
    Ok(available_sources(&catalog, reference))
}

/// Resolve the catalog id for a title once.
pub async fn resolve_catalog_id(state: &HostState, reference: &MediaReference) -> Resolution {
    state.resolver().resolve(reference).await
}

/// Mount a player for a title.
///
/// Catalogs keyed by the catalog id start resolution immediately.
pub fn open_player(
    state: &HostState,
    reference: MediaReference,
    catalog: CatalogKind,
) -> Result<Player, PlayerError> {
    let source_catalog = state.config().catalog(catalog)?;
    let resolver = catalog
        .resolves_catalog_id()
        .then(|| Arc::clone(state.resolver()));
    info!(title = %reference.title, ?catalog, "opening player");
    Ok(Player::mount(reference, source_catalog, resolver))
}

/// Open a player, wait for resolution, optionally switch source, and
/// return what the host would render. The player is closed afterwards.
///
/// # Arguments
/// * `select` - Index into the available sources to switch to
/// * `retry_if_missing` - Re-run resolution once if the first run found
///   nothing and sources are still shown
///
/// # Errors
/// `PlayerError::SourceOutOfRange` if `select` is past the available list.
pub async fn play(
    state: &HostState,
    reference: MediaReference,
    catalog: CatalogKind,
    select: Option<usize>,
    retry_if_missing: bool,
) -> Result<PlayerView, PlayerError> {
    let player = open_player(state, reference, catalog)?;
    player.settle().await;

    if retry_if_missing
        && offers_retry(&player.view().await, player.resolution().await.as_ref())
        && player.retry().await
    {
        player.settle().await;
    }

    let result = match select {
        Some(index) => player.select(index).await,
        None => Ok(()),
    };
    let view = player.view().await;
    player.close().await;

    result.map(|_| view)
}

/// Whether the rendered view offers a retry: the lookup ran and found
/// nothing, and sources are still shown. The unavailable view is terminal.
fn offers_retry(view: &PlayerView, resolution: Option<&Resolution>) -> bool {
    let missing = resolution.is_some_and(|resolution| !resolution.is_found());
    missing && matches!(view, PlayerView::Playing { .. })
}
