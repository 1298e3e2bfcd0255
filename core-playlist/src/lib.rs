//! # Playlist Ordering Core
//!
//! Keeps a client-side view of a remote, position-addressed collection in step
//! with the remote store while applying user edits.
//!
//! ## Overview
//!
//! - [`PositionIndex`]: local ordered mirror, no I/O.
//! - [`OrderingEngine`]: turns insert/remove/replace/move into the store's
//!   `insert_at`/`delete_at` primitives and updates the index after each
//!   confirmed success.
//! - [`CollectionSession`]: attach to or create a collection, then edit it.
//! - [`memory::InMemoryOrderedStore`]: store implementation for tests and
//!   local runs.
//!
//! The remote service has no atomic replace or move. Both are a delete followed
//! by an insert; when only the delete lands the caller receives
//! [`PlaylistError::PartialFailure`] and the session must be rehydrated.

pub mod engine;
pub mod error;
pub mod memory;
pub mod position_index;
pub mod session;

pub use engine::OrderingEngine;
pub use error::{CompoundOperation, IndexOutOfRange, PlaylistError, Result};
pub use position_index::PositionIndex;
pub use session::{BulkInsertFailure, BulkInsertReport, CollectionSession, SyncState};
