use bridge_traits::error::RemoteError;
use bridge_traits::ItemReference;
use std::fmt;
use thiserror::Error;

/// Local bounds violation raised by [`PositionIndex`](crate::PositionIndex).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Index out of range: position {position} with length {len}")]
pub struct IndexOutOfRange {
    pub position: usize,
    pub len: usize,
}

/// The two-step operations built from delete-then-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOperation {
    Replace,
    Move,
}

impl fmt::Display for CompoundOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundOperation::Replace => f.write_str("replace"),
            CompoundOperation::Move => f.write_str("move"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaylistError {
    /// Position argument outside the cached collection; nothing was sent.
    #[error("Invalid position {position} for collection of length {len}")]
    InvalidPosition { position: usize, len: usize },

    /// A remote call failed before anything changed on either side.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The delete leg of a compound operation succeeded but the insert leg
    /// did not. The remote collection is one item short of the cache.
    #[error(
        "{operation} left the collection inconsistent: {lost_item} was removed from position \
         {removed_from} but inserting '{attempted_item_id}' at position {insert_position} failed \
         ({source}). Refresh the collection and retry"
    )]
    PartialFailure {
        operation: CompoundOperation,
        removed_from: usize,
        lost_item: ItemReference,
        attempted_item_id: String,
        insert_position: usize,
        #[source]
        source: RemoteError,
    },

    /// Attach target does not exist remotely.
    #[error("Collection not found: {collection_id}")]
    NotFound { collection_id: String },

    /// The session's cache can no longer be trusted; re-hydrate first.
    #[error("Session for collection {collection_id} is out of sync; rehydrate before making changes")]
    StaleSession { collection_id: String },
}

impl PlaylistError {
    /// Whether the caller must re-fetch the collection before trusting the
    /// cached positions again.
    pub fn requires_rehydrate(&self) -> bool {
        match self {
            PlaylistError::PartialFailure { .. } | PlaylistError::StaleSession { .. } => true,
            PlaylistError::Remote(e) => e.outcome_unknown(),
            PlaylistError::InvalidPosition { .. } | PlaylistError::NotFound { .. } => false,
        }
    }

    /// Whether repeating the same call unchanged can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlaylistError::Remote(e) if !e.outcome_unknown())
    }
}

impl From<IndexOutOfRange> for PlaylistError {
    fn from(error: IndexOutOfRange) -> Self {
        PlaylistError::InvalidPosition {
            position: error.position,
            len: error.len,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlaylistError>;
