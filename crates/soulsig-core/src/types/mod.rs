//! Core domain types for the soulsig engine.

mod archetype;
mod parameter;
mod point;
mod profile;
mod signature;

pub use archetype::{Archetype, ArchetypeMatch, COMPLEMENTARY_PAIRS};
pub use parameter::{Dimension, ParameterData, ParameterId, PARAMETER_COUNT};
pub use point::{normalize_hue, PersonalityPoint, HUE_MODULUS, LINEAR_MAX};
pub use profile::{
    DimensionConfidence, InferenceEvent, InferencePhase, PhaseThresholds, SubjectProfile,
};
pub use signature::Signature;

/// Identifier for a subject or candidate.
pub type SubjectId = uuid::Uuid;
