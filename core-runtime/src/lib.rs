//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the playlist core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! Every other core crate logs through `tracing` and reads its settings from
//! [`config::CoreConfig`]; this crate is where both are set up.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
