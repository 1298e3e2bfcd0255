//! Workspace façade crate.
//!
//! Exposes the playlist ordering engine and its service wrapper behind a
//! single dependency. Host applications (bot commands, HTTP handlers, CLIs)
//! can depend on `playlist-core-workspace` and enable `desktop-shims` to get
//! the reqwest-backed bridge wired in automatically.

#[cfg(feature = "desktop-shims")]
pub use core_playlist as playlist;

#[cfg(feature = "desktop-shims")]
pub use core_service as service;
