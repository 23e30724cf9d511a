//! # FleetOps Common Library
//!
//! Shared code for the FleetOps scheduling services including:
//! - Error types
//! - Configuration loading (TOML file, environment, compiled defaults)
//! - Locale-aware report messages
//! - Event types (FleetEvent enum) and the EventBus

pub mod config;
pub mod error;
pub mod events;
pub mod locale;

pub use error::{Error, Result};
pub use locale::Locale;
