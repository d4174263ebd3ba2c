#![forbid(unsafe_code)]

//! Collaborator seams: persistence and asset loading.
//!
//! The engine never talks to a database or an image pipeline directly; it
//! consumes these traits. Production embeds real backends, tests use
//! [`InMemoryPersistence`](crate::memory::InMemoryPersistence) and a
//! recording loader.

use std::sync::Arc;

use cardwall_core::{Card, FetchError, NewCard};

/// Callback invoked for every newly created card on the push feed.
pub type InsertCallback = Arc<dyn Fn(Card) + Send + Sync>;

/// Guard returned by [`Persistence::subscribe_on_insert`].
///
/// Unsubscribes on drop or on an explicit [`unsubscribe`](Self::unsubscribe)
/// call; either way the teardown runs exactly once, so calling it on an
/// already-released guard is safe.
pub struct Unsubscribe(Option<Box<dyn FnOnce() + Send>>);

impl Unsubscribe {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(teardown)))
    }

    /// A guard with nothing to release.
    pub fn noop() -> Self {
        Self(None)
    }

    pub fn unsubscribe(mut self) {
        if let Some(teardown) = self.0.take() {
            teardown();
        }
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        if let Some(teardown) = self.0.take() {
            teardown();
        }
    }
}

/// The persistence service the wall is fed from.
///
/// `list_cards` returns cards ordered by `created_at` descending. All
/// methods are called from engine worker threads; implementations must be
/// internally synchronized.
pub trait Persistence: Send + Sync {
    fn list_cards(&self, offset: u64, limit: usize) -> Result<Vec<Card>, FetchError>;

    fn count_cards(&self) -> Result<u64, FetchError>;

    fn create_card(&self, input: NewCard) -> Result<Card, FetchError>;

    /// Register for push delivery of newly created cards. Delivery may be
    /// lossy (reconnect gaps); the count reconciler compensates.
    fn subscribe_on_insert(&self, callback: InsertCallback) -> Unsubscribe;
}

/// Resolves card photos. Fire-and-forget: completion comes back through
/// the engine's `report_asset_ready` / `report_asset_failed` sinks.
pub trait AssetLoader: Send + Sync {
    fn request(&self, card: &Card);
}

/// Loader that never reports; the asset-wait timeout carries the queue.
pub struct NullAssetLoader;

impl AssetLoader for NullAssetLoader {
    fn request(&self, _card: &Card) {}
}
