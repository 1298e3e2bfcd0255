//! # Ordering Engine
//!
//! Maps the user-level edits (insert, remove, replace, move) onto the remote
//! store's positional primitives and mirrors each confirmed remote change into
//! a [`PositionIndex`].
//!
//! ## Consistency contract
//!
//! - Positions are validated against the cached index before any remote call.
//!   A rejected call costs zero network round-trips.
//! - The index is updated only after the corresponding remote call returns
//!   success, so cache and remote agree whenever an operation returns `Ok`.
//! - `replace` and `move_item` are delete-then-insert. If the delete succeeds
//!   and the insert fails, the caller gets
//!   [`PlaylistError::PartialFailure`] naming the lost item and the index is
//!   left as it was before the call. No compensation is attempted.

use crate::error::{CompoundOperation, PlaylistError, Result};
use crate::position_index::PositionIndex;
use bridge_traits::{ItemReference, OrderedStore};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Stateless translator from edits to remote primitives.
///
/// Holds only the store; the index to keep in sync is passed per call so one
/// engine can serve any number of collections.
#[derive(Clone)]
pub struct OrderingEngine {
    store: Arc<dyn OrderedStore>,
}

impl OrderingEngine {
    pub fn new(store: Arc<dyn OrderedStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn OrderedStore> {
        &self.store
    }

    /// Insert `item_id` at `position` (`None` appends).
    ///
    /// One remote call.
    #[instrument(skip(self, index), fields(len = index.len()))]
    pub async fn insert(
        &self,
        collection_id: &str,
        index: &mut PositionIndex,
        item_id: &str,
        position: Option<usize>,
    ) -> Result<ItemReference> {
        if let Some(position) = position {
            check_insert_position(index, position)?;
        }

        let inserted = self
            .store
            .insert_at(collection_id, item_id, position)
            .await?;

        index.insert(position, inserted.clone())?;
        debug!(item = %inserted, "Inserted item");
        Ok(inserted)
    }

    /// Remove the item at `position` and return it.
    ///
    /// One remote call.
    #[instrument(skip(self, index), fields(len = index.len()))]
    pub async fn remove(
        &self,
        collection_id: &str,
        index: &mut PositionIndex,
        position: usize,
    ) -> Result<ItemReference> {
        index.get(position)?;

        self.store.delete_at(collection_id, position).await?;

        let removed = index.remove_at(position)?;
        debug!(item = %removed, "Removed item");
        Ok(removed)
    }

    /// Swap the item at `position` for `item_id`, returning the new item.
    ///
    /// Two remote calls: delete at `position`, then insert at `position`.
    #[instrument(skip(self, index), fields(len = index.len()))]
    pub async fn replace(
        &self,
        collection_id: &str,
        index: &mut PositionIndex,
        position: usize,
        item_id: &str,
    ) -> Result<ItemReference> {
        let previous = index.get(position)?.clone();

        self.store.delete_at(collection_id, position).await?;

        let inserted = match self
            .store
            .insert_at(collection_id, item_id, Some(position))
            .await
        {
            Ok(inserted) => inserted,
            Err(source) => {
                return Err(partial_failure(
                    CompoundOperation::Replace,
                    collection_id,
                    position,
                    previous,
                    item_id,
                    position,
                    source,
                ));
            }
        };

        index.remove_at(position)?;
        index.insert(Some(position), inserted.clone())?;
        debug!(removed = %previous, inserted = %inserted, "Replaced item");
        Ok(inserted)
    }

    /// Move the item at `from` so that it ends up at `to`.
    ///
    /// `to` is the item's final position, so `move_item(0, 2)` on
    /// `[A, B, C, D]` yields `[B, C, A, D]`. Equal positions are a no-op with
    /// no remote calls; otherwise two remote calls: delete at `from`, then
    /// insert at `to`.
    #[instrument(skip(self, index), fields(len = index.len()))]
    pub async fn move_item(
        &self,
        collection_id: &str,
        index: &mut PositionIndex,
        from: usize,
        to: usize,
    ) -> Result<()> {
        let moving = index.get(from)?.clone();
        index.get(to)?;

        if from == to {
            debug!("Move to same position, nothing to do");
            return Ok(());
        }

        self.store.delete_at(collection_id, from).await?;

        // After the delete the list is one shorter; `to` in that list is
        // exactly the final position in both directions.
        let inserted = match self
            .store
            .insert_at(collection_id, &moving.id, Some(to))
            .await
        {
            Ok(inserted) => inserted,
            Err(source) => {
                let attempted = moving.id.clone();
                return Err(partial_failure(
                    CompoundOperation::Move,
                    collection_id,
                    from,
                    moving,
                    &attempted,
                    to,
                    source,
                ));
            }
        };

        index.remove_at(from)?;
        index.insert(Some(to), inserted)?;
        debug!(item = %moving, from, to, "Moved item");
        Ok(())
    }
}

fn check_insert_position(index: &PositionIndex, position: usize) -> Result<()> {
    let len = index.len();
    if position > len {
        return Err(PlaylistError::InvalidPosition { position, len });
    }
    Ok(())
}

fn partial_failure(
    operation: CompoundOperation,
    collection_id: &str,
    removed_from: usize,
    lost_item: ItemReference,
    attempted_item_id: &str,
    insert_position: usize,
    source: bridge_traits::RemoteError,
) -> PlaylistError {
    error!(
        collection_id = %collection_id,
        %operation,
        lost_item = %lost_item,
        removed_from,
        insert_position,
        error = %source,
        "Remote collection diverged from local index"
    );
    PlaylistError::PartialFailure {
        operation,
        removed_from,
        lost_item,
        attempted_item_id: attempted_item_id.to_string(),
        insert_position,
        source,
    }
}
