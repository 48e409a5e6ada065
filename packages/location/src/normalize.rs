//! Kelurahan name normalization.
//!
//! Applied symmetrically when the index is built and when it is queried,
//! so "Duren Sawit", " duren  sawit " and "DUREN SAWIT" share one key.

/// Normalizes a location name for lookup.
///
/// Lowercases, trims, and collapses every run of interior whitespace into a
/// single space.
#[must_use]
pub fn normalize_name(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
