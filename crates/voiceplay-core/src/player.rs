//! Async player controller
//!
//! [`Player`] owns a [`PlayerSession`] behind a mutex and drives catalog id
//! resolution on a background task. Closing (or dropping) the player aborts
//! the task, and the session drops any completion that still slips through,
//! so nothing is written into a closed player.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::catalog::SourceCatalog;
use crate::error::Result;
use crate::resolver::Resolver;
use crate::session::{Phase, PlayerSession, PlayerView};
use crate::types::{MediaReference, Resolution};

/// One opened player
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use voiceplay_core::{LookupClient, MediaKind, MediaReference, Player, Resolver, SourceCatalog};
///
/// # async fn example() -> Result<(), voiceplay_core::PlayerError> {
/// let lookup = Arc::new(LookupClient::new()?);
/// let resolver = Arc::new(Resolver::with_lookup(lookup));
/// let reference = MediaReference::new("Брат", MediaKind::Movie).with_year(1997);
///
/// let player = Player::mount(reference, SourceCatalog::voice_over()?, Some(resolver));
/// player.settle().await;
/// println!("{:?}", player.view().await);
/// player.close().await;
/// # Ok(())
/// # }
/// ```
pub struct Player {
    session: Arc<Mutex<PlayerSession>>,
    resolver: Option<Arc<Resolver>>,
    task: StdMutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Open a player. With a resolver, catalog id resolution starts
    /// immediately on a spawned task.
    ///
    /// Must be called from within a Tokio runtime when `resolver` is set.
    pub fn mount(
        reference: MediaReference,
        catalog: SourceCatalog,
        resolver: Option<Arc<Resolver>>,
    ) -> Self {
        let session = PlayerSession::mount(reference, catalog, resolver.is_some());
        let generation = session.is_resolving().then(|| session.generation());

        let player = Self {
            session: Arc::new(Mutex::new(session)),
            resolver,
            task: StdMutex::new(None),
        };
        if let Some(generation) = generation {
            player.spawn_resolution(generation);
        }
        player
    }

    fn spawn_resolution(&self, generation: u64) {
        let Some(resolver) = self.resolver.clone() else {
            return;
        };
        let session = Arc::clone(&self.session);

        let handle = tokio::spawn(async move {
            let reference = session.lock().await.reference().clone();
            let resolution = resolver.resolve(&reference).await;
            let applied = session.lock().await.complete_resolution(generation, resolution);
            debug!(generation, applied, "resolution finished");
        });

        if let Ok(mut slot) = self.task.lock() {
            if let Some(previous) = slot.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Re-run catalog id resolution from the first step.
    ///
    /// Returns `false` when ignored: no resolver, a resolution already in
    /// flight, or the player is closed.
    pub async fn retry(&self) -> bool {
        let generation = self.session.lock().await.begin_resolution();
        match generation {
            Some(generation) => {
                info!(generation, "retrying catalog id resolution");
                self.spawn_resolution(generation);
                true
            }
            None => false,
        }
    }

    /// Switch to another available source. See [`PlayerSession::select`].
    pub async fn select(&self, index: usize) -> Result<()> {
        self.session.lock().await.select(index)
    }

    pub async fn content_loaded(&self) {
        self.session.lock().await.content_loaded();
    }

    pub async fn content_failed(&self) {
        self.session.lock().await.content_failed();
    }

    pub async fn view(&self) -> PlayerView {
        self.session.lock().await.view()
    }

    pub async fn phase(&self) -> Phase {
        self.session.lock().await.phase()
    }

    pub async fn resolution(&self) -> Option<Resolution> {
        self.session.lock().await.resolution().cloned()
    }

    /// Snapshot of the underlying session.
    pub async fn snapshot(&self) -> PlayerSession {
        self.session.lock().await.clone()
    }

    /// Wait for the in-flight resolution, if any, to finish.
    pub async fn settle(&self) {
        let handle = self.task.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                debug!(error = %e, "resolution task ended without completing");
            }
        }
    }

    /// Dismiss the player: abort in-flight resolution and stop accepting updates.
    pub async fn close(&self) {
        self.abort_task();
        self.session.lock().await.close();
        debug!("player closed");
    }

    fn abort_task(&self) {
        if let Some(handle) = self.task.lock().ok().and_then(|mut slot| slot.take()) {
            handle.abort();
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.abort_task();
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
