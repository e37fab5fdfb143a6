//! Error types for soulsig-core.
//!
//! This module defines the central error type [`CoreError`] used throughout
//! the soulsig crates, along with the [`CoreResult<T>`] type alias.
//!
//! # Propagation policy
//!
//! Codec and index errors are surfaced immediately (they indicate programmer
//! or data-integrity bugs). Analyzer-call failures are caught at the
//! inference-engine boundary and degrade to "zero signal for this message".
//! An empty match list is a valid result, never an error.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for soulsig operations.
///
/// # Examples
///
/// ```rust
/// use soulsig_core::CoreError;
/// use uuid::Uuid;
///
/// let error = CoreError::ProfileNotFound { id: Uuid::nil() };
/// assert!(error.to_string().contains("Profile not found"));
/// ```
#[derive(Debug, Error)]
pub enum CoreError {
    /// A field value failed validation constraints.
    ///
    /// # When This Occurs
    ///
    /// - Malformed signature string (not 6 hex digits)
    /// - Out-of-range or non-finite personality coordinates
    /// - Invalid option ranges (e.g. `min_compatibility > 100`)
    #[error("Validation error: {field} - {message}")]
    ValidationError {
        /// Name of the field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// The engine was used before it was initialized.
    ///
    /// # When This Occurs
    ///
    /// - Matching invoked before a spatial index was attached
    /// - Configuration values rejected at load time
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A requested subject profile does not exist.
    #[error("Profile not found: {id}")]
    ProfileNotFound {
        /// The subject id that could not be resolved
        id: Uuid,
    },

    /// The text analyzer raised or returned a malformed signal set.
    ///
    /// Callers inside the inference engine catch this and degrade to a
    /// zero-signal message; it is only propagated from direct analyzer use.
    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    /// Compatibility scoring was invoked with incompatible or missing data.
    #[error("Compatibility error: {0}")]
    CompatibilityError(String),

    /// An error occurred during persistence operations.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// An error occurred in the spatial index.
    #[error("Index error: {0}")]
    IndexError(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::StorageError(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::ConfigurationError(err.to_string())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
