//! Remote Ordered Store Abstraction
//!
//! The remote service that owns a playlist exposes only positional primitives:
//! list the items, insert one item at a position, delete the item at a
//! position. There is no atomic replace or move. This module defines that
//! contract plus the value types that cross it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RemoteResult;

/// Sharing level requested when a collection is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Unlisted,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "unlisted" => Ok(Visibility::Unlisted),
            other => Err(format!("Unknown visibility: {}", other)),
        }
    }
}

/// One element of an ordered collection.
///
/// `id` is the opaque external identifier (e.g. a video id); `label` is the
/// display title the store assigned when the item was inserted. Never mutated
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemReference {
    pub id: String,
    pub label: String,
}

impl ItemReference {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for ItemReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "'{}' ({})", self.label, self.id)
        }
    }
}

/// Identifying metadata for one remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionHandle {
    /// Remote identifier, immutable
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Shareable URL, immutable
    pub locator: String,
    pub created_at: DateTime<Utc>,
}

/// Remote Ordered Store client
///
/// Every method maps to exactly one network call and none retries internally;
/// retry policy belongs to the caller. Implementations know nothing about any
/// client-side cache of the collection.
///
/// Positions are zero-based.
#[async_trait]
pub trait OrderedStore: Send + Sync {
    /// Create a new, empty collection.
    async fn create_collection(
        &self,
        title: &str,
        visibility: Visibility,
    ) -> RemoteResult<CollectionHandle>;

    /// Fetch collection metadata.
    ///
    /// Fails with [`RemoteErrorKind::NotFound`](crate::error::RemoteErrorKind::NotFound)
    /// when no such collection exists.
    async fn fetch_collection(&self, collection_id: &str) -> RemoteResult<CollectionHandle>;

    /// Find collections whose title matches `query`, best match first.
    async fn search_collections(&self, query: &str) -> RemoteResult<Vec<CollectionHandle>>;

    /// Every collection the caller can see, oldest first. Empty when none.
    async fn list_collections(&self) -> RemoteResult<Vec<CollectionHandle>>;

    /// The most recently created collection, or `None` when there are none.
    async fn latest_collection(&self) -> RemoteResult<Option<CollectionHandle>>;

    /// List the collection's items in authoritative order.
    async fn list_items(&self, collection_id: &str) -> RemoteResult<Vec<ItemReference>>;

    /// Insert `item_id` at `position`, or append when `position` is `None`.
    ///
    /// The store is authoritative on bounds (`0 <= position <= len`); the
    /// client does not pre-check. Returns the stored reference with its
    /// assigned label.
    async fn insert_at(
        &self,
        collection_id: &str,
        item_id: &str,
        position: Option<usize>,
    ) -> RemoteResult<ItemReference>;

    /// Delete the item currently at `position`.
    ///
    /// Fails with [`RemoteErrorKind::OutOfRange`](crate::error::RemoteErrorKind::OutOfRange)
    /// unless `position < len`.
    async fn delete_at(&self, collection_id: &str, position: usize) -> RemoteResult<()>;

    /// Delete the whole collection.
    async fn delete_collection(&self, collection_id: &str) -> RemoteResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_round_trip_through_str() {
        assert_eq!("Unlisted".parse::<Visibility>(), Ok(Visibility::Unlisted));
        assert_eq!(Visibility::Public.to_string(), "public");
        assert!("friends-only".parse::<Visibility>().is_err());
        assert_eq!(Visibility::default(), Visibility::Private);
    }

    #[test]
    fn test_visibility_serde_lowercase() {
        let json = serde_json::to_string(&Visibility::Unlisted).unwrap();
        assert_eq!(json, "\"unlisted\"");
    }

    #[test]
    fn test_item_reference_display() {
        let item = ItemReference::new("dQw4w9WgXcQ", "Never Gonna Give You Up");
        assert_eq!(item.to_string(), "'Never Gonna Give You Up' (dQw4w9WgXcQ)");
        assert_eq!(ItemReference::new("abc", "").to_string(), "abc");
    }
}
