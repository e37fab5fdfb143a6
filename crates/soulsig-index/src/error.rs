//! Error types for index operations.

use thiserror::Error;

/// Errors raised by the spatial index.
///
/// Index errors indicate programmer or data-integrity bugs and are
/// always surfaced (fail fast), never swallowed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndexError {
    /// A query range is inverted or non-finite.
    #[error("Invalid {axis} range: [{lo}, {hi}]")]
    InvalidRange {
        /// Axis name ("hue", "manifested", "soul").
        axis: &'static str,
        lo: f32,
        hi: f32,
    },

    /// A query parameter is non-finite.
    #[error("Non-finite {what}: {value}")]
    NonFinite {
        /// What carried the bad value (e.g. "radius").
        what: &'static str,
        value: f32,
    },
}

/// Result type alias for index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;
