//! Subject profiles, inference events, and the inference phase machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::codec;
use crate::types::{ParameterData, ParameterId, PersonalityPoint, Signature, SubjectId};

/// Ordered stages of conversational depth.
///
/// Transitions are driven purely by cumulative message count against the
/// configured [`PhaseThresholds`]; there are no terminal states and no
/// regressions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InferencePhase {
    /// Opening small talk; broad, low-confidence signals.
    #[default]
    Surface,
    /// Preferences and habits start to separate.
    LayerPeeling,
    /// Values and motivations become visible.
    CoreExcavation,
    /// Deep identity material.
    SoulMapping,
}

impl InferencePhase {
    /// Phase for a cumulative message count under the given thresholds.
    pub fn for_message_count(count: u64, thresholds: &PhaseThresholds) -> Self {
        if count <= thresholds.surface_max {
            Self::Surface
        } else if count <= thresholds.layer_peeling_max {
            Self::LayerPeeling
        } else if count <= thresholds.core_excavation_max {
            Self::CoreExcavation
        } else {
            Self::SoulMapping
        }
    }

    /// All phases in order.
    #[inline]
    pub const fn all() -> [InferencePhase; 4] {
        [
            Self::Surface,
            Self::LayerPeeling,
            Self::CoreExcavation,
            Self::SoulMapping,
        ]
    }
}

/// Message-count thresholds for phase transitions.
///
/// Exposed as configuration rather than constants; a confidence-driven
/// transition is an equally valid design an implementer may prefer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseThresholds {
    /// Last message count still in `Surface`.
    pub surface_max: u64,
    /// Last message count still in `LayerPeeling`.
    pub layer_peeling_max: u64,
    /// Last message count still in `CoreExcavation`.
    pub core_excavation_max: u64,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            surface_max: 25,
            layer_peeling_max: 75,
            core_excavation_max: 150,
        }
    }
}

/// Immutable record of one parameter contribution.
///
/// Appended to the profile's event log on every parameter update; never
/// mutated afterward. Used for explainability and for the next-question
/// heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceEvent {
    /// When the contributing message was processed.
    pub timestamp: DateTime<Utc>,
    /// The message text that produced the signal.
    pub source_text: String,
    /// The parameter that was updated.
    pub parameter: ParameterId,
    /// Value delta applied to the parameter.
    pub contribution: f32,
    /// Confidence delta applied (negative under contradiction damping).
    pub confidence_gain: f32,
    /// Inference phase at the time of the update.
    pub phase: InferencePhase,
}

/// Per-dimension confidence summary.
///
/// Each entry is the weight-averaged confidence of the dimension's
/// materialized parameters (untouched parameters have not produced any
/// evidence and do not dilute the mean).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionConfidence {
    /// Confidence in the hue coordinate, `[0, 1]`.
    pub hue: f32,
    /// Confidence in the manifested coordinate, `[0, 1]`.
    pub manifested: f32,
    /// Confidence in the soul coordinate, `[0, 1]`.
    pub soul: f32,
}

/// The full inferred state of one subject.
///
/// Owned exclusively by the inference engine; the matching layer only
/// ever reads the derived `(id, point, signature)` view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectProfile {
    /// Subject identifier.
    pub subject_id: SubjectId,
    /// Current position in personality space.
    pub point: PersonalityPoint,
    /// Current compact signature (kept in sync with `point`).
    pub signature: Signature,
    /// Per-dimension confidence summary.
    pub dimension_confidence: DimensionConfidence,
    /// Materialized parameters, keyed by catalog id.
    pub parameters: BTreeMap<ParameterId, ParameterData>,
    /// Append-only inference event log.
    pub events: Vec<InferenceEvent>,
    /// Current inference phase.
    pub phase: InferencePhase,
    /// Cumulative processed message count.
    pub message_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl SubjectProfile {
    /// Create an empty profile at the neutral point.
    pub fn new(subject_id: SubjectId, now: DateTime<Utc>) -> Self {
        let point = PersonalityPoint::neutral();
        Self {
            subject_id,
            point,
            signature: codec::encode(&point),
            dimension_confidence: DimensionConfidence::default(),
            parameters: BTreeMap::new(),
            events: Vec::new(),
            phase: InferencePhase::Surface,
            message_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fetch-or-materialize a parameter at its neutral default.
    pub fn parameter_mut(&mut self, id: ParameterId, now: DateTime<Utc>) -> &mut ParameterData {
        self.parameters
            .entry(id)
            .or_insert_with(|| ParameterData::neutral(now))
    }

    /// Parameters ranked by ascending confidence (lowest-evidence first).
    ///
    /// Unmaterialized catalog parameters rank before everything else at
    /// confidence 0, in catalog order.
    pub fn parameters_by_confidence(&self) -> Vec<(ParameterId, f32)> {
        let mut ranked: Vec<(ParameterId, f32)> = ParameterId::all()
            .into_iter()
            .map(|id| {
                let confidence = self.parameters.get(&id).map_or(0.0, |p| p.confidence);
                (id, confidence)
            })
            .collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}
