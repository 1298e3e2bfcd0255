//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop hosts
//! (bot processes, CLIs, local servers on macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! // Hand it to CoreConfig::builder().http_client(http_client)
//! ```

mod http;

pub use http::ReqwestHttpClient;
