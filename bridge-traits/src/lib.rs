//! # Host Bridge Traits
//!
//! Capability traits the playlist core depends on but does not implement.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-shot async HTTP transport
//! - [`OrderedStore`](store::OrderedStore) - Remote ordered collection
//!   primitives (list / insert-at / delete-at, create / fetch / delete)
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to a host
//!
//! ## Implementations
//!
//! | Trait | Crate |
//! |-------|-------|
//! | `HttpClient` | `bridge-desktop` (reqwest) |
//! | `OrderedStore` | `provider-playlist-api` (REST), `core-playlist::memory` (in-memory) |
//!
//! ## Error Handling
//!
//! Transport-level failures use [`BridgeError`](error::BridgeError). Store
//! calls use [`RemoteError`](error::RemoteError), which carries a
//! [`RemoteErrorKind`](error::RemoteErrorKind) classification so the ordering
//! engine can tell "rejected, nothing happened" apart from "timed out, it may
//! have happened".
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`: one store client is shared by every
//! collection session in the process.

pub mod error;
pub mod http;
pub mod store;
pub mod time;

pub use error::{BridgeError, RemoteError, RemoteErrorKind, RemoteResult};

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use store::{CollectionHandle, ItemReference, OrderedStore, Visibility};
pub use time::{Clock, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
