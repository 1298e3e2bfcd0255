//! # Collection Session
//!
//! A session binds one remote collection to a freshly fetched
//! [`PositionIndex`] and exposes the four edits through the
//! [`OrderingEngine`].
//!
//! ## Sync state
//!
//! The session tracks whether its cache can be trusted:
//!
//! - [`SyncState::Synced`]: cache matches the last known remote state.
//! - [`SyncState::Mutating`]: an edit has started and not finished. A session
//!   left in this state had its operation future dropped mid-flight.
//! - [`SyncState::Diverged`]: a compound edit failed halfway, or a remote call
//!   failed without telling us whether it took effect.
//!
//! Edits on a session that is not `Synced` fail with
//! [`PlaylistError::StaleSession`] without touching the network. Call
//! [`CollectionSession::rehydrate`] to re-fetch and continue.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = CollectionSession::attach(store, "PL123").await?;
//! session.insert("dQw4w9WgXcQ", None).await?;
//! session.move_item(3, 0).await?;
//! ```

use crate::engine::OrderingEngine;
use crate::error::{PlaylistError, Result};
use crate::position_index::PositionIndex;
use bridge_traits::{CollectionHandle, ItemReference, OrderedStore, RemoteError, Visibility};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Trust level of a session's cached index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Synced,
    Mutating,
    Diverged,
}

/// One item that could not be appended during [`CollectionSession::append_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct BulkInsertFailure {
    pub item_id: String,
    pub error: PlaylistError,
}

/// Outcome of a bulk append.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkInsertReport {
    /// Items appended, in order.
    pub inserted: Vec<ItemReference>,
    /// Items the store rejected.
    pub failed: Vec<BulkInsertFailure>,
    /// Items never attempted because the session stopped being synced.
    pub skipped: Vec<String>,
}

impl BulkInsertReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Handle + index + engine for one remote collection.
///
/// Not meant for concurrent edits: every mutating method takes `&mut self`.
/// Share across tasks behind a `tokio::sync::Mutex` if needed.
pub struct CollectionSession {
    engine: OrderingEngine,
    handle: CollectionHandle,
    index: PositionIndex,
    state: SyncState,
}

impl std::fmt::Debug for CollectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionSession")
            .field("handle", &self.handle)
            .field("len", &self.index.len())
            .field("state", &self.state)
            .finish()
    }
}

impl CollectionSession {
    /// Open an existing collection: fetch its metadata, then its items.
    #[instrument(skip(store))]
    pub async fn attach(store: Arc<dyn OrderedStore>, collection_id: &str) -> Result<Self> {
        let (handle, index) = hydrate(store.as_ref(), collection_id).await?;
        info!(title = %handle.title, len = index.len(), "Attached to collection");

        Ok(Self {
            engine: OrderingEngine::new(store),
            handle,
            index,
            state: SyncState::Synced,
        })
    }

    /// Create a new, empty collection and open a session on it.
    #[instrument(skip(store))]
    pub async fn create_new(
        store: Arc<dyn OrderedStore>,
        title: &str,
        visibility: Visibility,
    ) -> Result<Self> {
        let handle = store.create_collection(title, visibility).await?;
        info!(collection_id = %handle.id, "Created collection");

        Ok(Self {
            engine: OrderingEngine::new(store),
            handle,
            index: PositionIndex::new(),
            state: SyncState::Synced,
        })
    }

    pub fn handle(&self) -> &CollectionHandle {
        &self.handle
    }

    pub fn collection_id(&self) -> &str {
        &self.handle.id
    }

    /// Cached items in order.
    pub fn items(&self) -> &[ItemReference] {
        self.index.as_slice()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, position: usize) -> Result<&ItemReference> {
        Ok(self.index.get(position)?)
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_synced(&self) -> bool {
        self.state == SyncState::Synced
    }

    /// Insert `item_id` at `position`, or append when `None`.
    pub async fn insert(&mut self, item_id: &str, position: Option<usize>) -> Result<ItemReference> {
        self.begin()?;
        let result = self
            .engine
            .insert(&self.handle.id, &mut self.index, item_id, position)
            .await;
        self.settle(result)
    }

    pub async fn append(&mut self, item_id: &str) -> Result<ItemReference> {
        self.insert(item_id, None).await
    }

    /// Remove and return the item at `position`.
    pub async fn remove(&mut self, position: usize) -> Result<ItemReference> {
        self.begin()?;
        let result = self
            .engine
            .remove(&self.handle.id, &mut self.index, position)
            .await;
        self.settle(result)
    }

    /// Replace the item at `position` with `item_id`; returns the new item.
    pub async fn replace(&mut self, position: usize, item_id: &str) -> Result<ItemReference> {
        self.begin()?;
        let result = self
            .engine
            .replace(&self.handle.id, &mut self.index, position, item_id)
            .await;
        self.settle(result)
    }

    /// Move the item at `from` to final position `to`.
    pub async fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.begin()?;
        let result = self
            .engine
            .move_item(&self.handle.id, &mut self.index, from, to)
            .await;
        self.settle(result)
    }

    /// Append each id in order.
    ///
    /// Rejected items are recorded and the run continues; once the session
    /// stops being synced the remaining ids are reported as skipped.
    pub async fn append_all<I, S>(&mut self, item_ids: I) -> BulkInsertReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BulkInsertReport::default();

        for item_id in item_ids {
            let item_id = item_id.as_ref();
            if !self.is_synced() {
                report.skipped.push(item_id.to_string());
                continue;
            }
            match self.append(item_id).await {
                Ok(item) => report.inserted.push(item),
                Err(error) => {
                    warn!(item_id, error = %error, "Failed to append item");
                    report.failed.push(BulkInsertFailure {
                        item_id: item_id.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            collection_id = %self.handle.id,
            inserted = report.inserted.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "Bulk append finished"
        );
        report
    }

    /// Discard the cache and re-fetch handle and items from the store.
    ///
    /// On failure the previous cache and state are kept.
    #[instrument(skip(self), fields(collection_id = %self.handle.id, state = ?self.state))]
    pub async fn rehydrate(&mut self) -> Result<()> {
        let (handle, index) = hydrate(self.engine.store().as_ref(), &self.handle.id).await?;
        self.handle = handle;
        self.index = index;
        self.state = SyncState::Synced;
        info!(len = self.index.len(), "Rehydrated collection");
        Ok(())
    }

    /// Release the session.
    pub fn discard(self) {
        info!(collection_id = %self.handle.id, "Discarded session");
    }

    fn begin(&mut self) -> Result<()> {
        if self.state != SyncState::Synced {
            return Err(PlaylistError::StaleSession {
                collection_id: self.handle.id.clone(),
            });
        }
        self.state = SyncState::Mutating;
        Ok(())
    }

    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        self.state = match &result {
            Err(e) if e.requires_rehydrate() => {
                warn!(collection_id = %self.handle.id, error = %e, "Session diverged from remote");
                SyncState::Diverged
            }
            _ => SyncState::Synced,
        };
        result
    }
}

async fn hydrate(
    store: &dyn OrderedStore,
    collection_id: &str,
) -> Result<(CollectionHandle, PositionIndex)> {
    let handle = store
        .fetch_collection(collection_id)
        .await
        .map_err(|e| not_found_or(e, collection_id))?;
    let items = store
        .list_items(&handle.id)
        .await
        .map_err(|e| not_found_or(e, collection_id))?;

    Ok((handle, PositionIndex::from_items(items)))
}

fn not_found_or(error: RemoteError, collection_id: &str) -> PlaylistError {
    if error.is_not_found() {
        PlaylistError::NotFound {
            collection_id: collection_id.to_string(),
        }
    } else {
        PlaylistError::Remote(error)
    }
}
