#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flood-risk location lookup by kelurahan name.
//!
//! Builds a deduplicated index over location property bags keyed by a
//! normalized form of the kelurahan name, loads it from `GeoJSON` files,
//! and keeps it in a [`LocationRepository`] that can be reloaded while
//! readers are being served.

pub mod index;
pub mod loader;
pub mod normalize;
pub mod repository;

pub use index::LocationIndex;
pub use repository::LocationRepository;

use thiserror::Error;

/// Errors that can occur while building or loading a location index.
///
/// A name that matches no location is not an error; lookups return `None`.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The input collection does not have the expected shape.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LocationError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
