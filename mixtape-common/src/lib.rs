//! # Mixtape Common Library
//!
//! Shared code for the mixtape workspace:
//! - Track catalog types and key normalization
//! - Configuration resolution
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{track_key, TrackEntry};
