//! Soulsig Core Library
//!
//! Provides core domain types, traits, and stub implementations for the
//! soulsig personality signature and matching system.
//!
//! # Architecture
//!
//! This crate defines:
//! - Domain types (`PersonalityPoint`, `Signature`, `Archetype`, `SubjectProfile`, etc.)
//! - The signature codec and distance primitives (`codec`, `distance`)
//! - Capability traits consumed by the engine (`TextAnalyzer`, `ProfileStore`)
//! - Error types and result aliases
//! - Configuration structures
//!
//! # Example
//!
//! ```
//! use soulsig_core::types::PersonalityPoint;
//! use soulsig_core::codec;
//!
//! let point = PersonalityPoint::new(45.0, 128.0, 200.0);
//! let signature = codec::encode(&point);
//! assert_eq!(signature.to_string().len(), 7); // "#" + 6 hex digits
//! ```

pub mod codec;
pub mod config;
pub mod distance;
pub mod error;
pub mod stubs;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use types::{Archetype, Dimension, ParameterId, PersonalityPoint, Signature};
