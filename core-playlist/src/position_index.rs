//! Client-side mirror of a remote collection's order.
//!
//! Purely local; never talks to the network. The ordering engine keeps it in
//! step with the remote store by applying the same primitive after each
//! remote success.

use crate::error::IndexOutOfRange;
use bridge_traits::ItemReference;

/// Ordered cache of [`ItemReference`]s, positions `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    items: Vec<ItemReference>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a remote listing, preserving its order.
    pub fn from_items(items: Vec<ItemReference>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Result<&ItemReference, IndexOutOfRange> {
        self.items.get(position).ok_or(IndexOutOfRange {
            position,
            len: self.items.len(),
        })
    }

    /// Insert at `position`, shifting later items right; `None` appends.
    pub fn insert(
        &mut self,
        position: Option<usize>,
        item: ItemReference,
    ) -> Result<(), IndexOutOfRange> {
        let len = self.items.len();
        match position {
            None => self.items.push(item),
            Some(position) if position <= len => self.items.insert(position, item),
            Some(position) => return Err(IndexOutOfRange { position, len }),
        }
        Ok(())
    }

    /// Remove and return the item at `position`, shifting later items left.
    pub fn remove_at(&mut self, position: usize) -> Result<ItemReference, IndexOutOfRange> {
        if position >= self.items.len() {
            return Err(IndexOutOfRange {
                position,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(position))
    }

    /// Snapshot of the current order.
    pub fn to_list(&self) -> Vec<ItemReference> {
        self.items.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemReference> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ItemReference] {
        &self.items
    }

    /// First position holding `item_id`, if any.
    pub fn position_of(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == item_id)
    }
}
