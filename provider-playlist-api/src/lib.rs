//! # Playlist API Provider
//!
//! Implements the `OrderedStore` trait for the playlist REST service.
//!
//! ## Overview
//!
//! This module provides:
//! - Playlist creation, lookup, title search and deletion
//! - Positional item listing, insertion and deletion
//! - Status code classification into remote error kinds
//! - Video link parsing for user-supplied item links

pub mod connector;
pub mod error;
pub mod links;
pub mod types;

pub use connector::PlaylistApiConnector;
pub use error::{PlaylistApiError, Result};
pub use links::{extract_video_id, VideoLinkError};
