#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Gang design recommendation.
//!
//! Loads the design decision matrix from CSV into a reloadable
//! [`RuleTable`], resolves surveyed gangs to a design module with
//! [`RuleResolver`], and exposes the compile-time [`catalog`] of module
//! descriptions.

pub mod catalog;
pub mod resolver;
pub mod table;

pub use resolver::RuleResolver;
pub use table::{RuleSet, RuleSource, RuleTable};

use thiserror::Error;

/// Errors that can occur while loading rules or looking up modules.
///
/// Failing to match a request is not an error: the resolver always falls
/// back to some rule.
#[derive(Debug, Error)]
pub enum DesignError {
    /// A rule row is missing a field or a value failed to parse.
    #[error("Data format error in row {row}, field '{field}': {message}")]
    DataFormat {
        /// 1-based data row number (0 when the problem is the header or
        /// the table as a whole).
        row: usize,
        /// Field being read.
        field: String,
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No design module exists with this id.
    #[error("Unknown design module id {id}")]
    UnknownModule {
        /// The requested module id.
        id: u32,
    },
}
