//! The weighted parameter catalog backing personality inference.
//!
//! Fifty named parameters are statically partitioned into the three
//! dimensions of the personality space. Each carries a fixed relative
//! weight within its dimension (weights per dimension sum to 1) and, for
//! hue-dimension parameters, a link to the archetype anchor it pulls
//! toward. Parameters live on a native `[0, 100]` scale.
//!
//! Lifecycle: a parameter materializes lazily at its neutral default
//! (mid-scale value, confidence 0) the first time any signal touches it,
//! is updated on every relevant message, and is never deleted - only
//! decayed toward lower confidence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Archetype;

/// Total number of catalog parameters.
pub const PARAMETER_COUNT: usize = 50;

/// Lower bound of every parameter's native scale.
pub const VALUE_MIN: f32 = 0.0;

/// Upper bound of every parameter's native scale.
pub const VALUE_MAX: f32 = 100.0;

/// Neutral default value for a freshly materialized parameter.
pub const VALUE_NEUTRAL: f32 = 50.0;

/// The three dimensions of the personality space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Circular archetypal direction.
    Hue,
    /// Outward expression intensity.
    Manifested,
    /// Inner depth.
    Soul,
}

impl Dimension {
    /// All dimensions in axis order.
    #[inline]
    pub const fn all() -> [Dimension; 3] {
        [Self::Hue, Self::Manifested, Self::Soul]
    }
}

/// One of the 50 catalog parameters.
///
/// Hue parameters come in pairs per archetype (a primary and a secondary
/// trait); manifested and soul parameters are free-standing. Weights
/// within each dimension sum to 1 by construction: hue uses 8 × (0.07 +
/// 0.055), the linear dimensions use 5 × 0.08 + 12 × 0.05.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterId {
    // Hue: two per archetype, anchor-linked
    Imagination,
    FutureOrientation,
    AnalyticalThinking,
    Curiosity,
    Loyalty,
    Dependability,
    Diplomacy,
    Cooperation,
    Adventurousness,
    Spontaneity,
    CreativeExpression,
    Originality,
    Compassion,
    EmotionalAttunement,
    Drive,
    Influence,
    // Manifested
    Assertiveness,
    Sociability,
    Expressiveness,
    Leadership,
    Confidence,
    Independence,
    Optimism,
    Discipline,
    Adaptability,
    Humor,
    Ambition,
    Openness,
    Patience,
    Resilience,
    Pragmatism,
    Decisiveness,
    Playfulness,
    // Soul
    SelfAwareness,
    Introspection,
    Authenticity,
    MeaningSeeking,
    EmotionalDepth,
    Vulnerability,
    SpiritualOpenness,
    MoralConviction,
    Gratitude,
    Forgiveness,
    InnerCalm,
    Wonder,
    ComfortWithSolitude,
    MortalityAwareness,
    Transcendence,
    DepthOfReflection,
    ValuesClarity,
}

impl ParameterId {
    /// The dimension this parameter contributes to.
    pub const fn dimension(&self) -> Dimension {
        use ParameterId::*;
        match self {
            Imagination | FutureOrientation | AnalyticalThinking | Curiosity | Loyalty
            | Dependability | Diplomacy | Cooperation | Adventurousness | Spontaneity
            | CreativeExpression | Originality | Compassion | EmotionalAttunement | Drive
            | Influence => Dimension::Hue,
            Assertiveness | Sociability | Expressiveness | Leadership | Confidence
            | Independence | Optimism | Discipline | Adaptability | Humor | Ambition
            | Openness | Patience | Resilience | Pragmatism | Decisiveness | Playfulness => {
                Dimension::Manifested
            }
            SelfAwareness | Introspection | Authenticity | MeaningSeeking | EmotionalDepth
            | Vulnerability | SpiritualOpenness | MoralConviction | Gratitude | Forgiveness
            | InnerCalm | Wonder | ComfortWithSolitude | MortalityAwareness | Transcendence
            | DepthOfReflection | ValuesClarity => Dimension::Soul,
        }
    }

    /// Fixed relative weight within this parameter's dimension.
    ///
    /// Per-dimension weights sum to 1.0.
    pub const fn weight(&self) -> f32 {
        use ParameterId::*;
        match self {
            // Hue primaries
            Imagination | AnalyticalThinking | Loyalty | Diplomacy | Adventurousness
            | CreativeExpression | Compassion | Drive => 0.07,
            // Hue secondaries
            FutureOrientation | Curiosity | Dependability | Cooperation | Spontaneity
            | Originality | EmotionalAttunement | Influence => 0.055,
            // Manifested / soul cores
            Assertiveness | Sociability | Expressiveness | Leadership | Confidence
            | SelfAwareness | Introspection | Authenticity | MeaningSeeking | EmotionalDepth => {
                0.08
            }
            // Everything else
            _ => 0.05,
        }
    }

    /// The archetype anchor this parameter pulls toward, for
    /// hue-dimension parameters.
    pub const fn archetype(&self) -> Option<Archetype> {
        use ParameterId::*;
        match self {
            Imagination | FutureOrientation => Some(Archetype::Visionary),
            AnalyticalThinking | Curiosity => Some(Archetype::Cognitive),
            Loyalty | Dependability => Some(Archetype::Guardian),
            Diplomacy | Cooperation => Some(Archetype::Harmonizer),
            Adventurousness | Spontaneity => Some(Archetype::Explorer),
            CreativeExpression | Originality => Some(Archetype::Creator),
            Compassion | EmotionalAttunement => Some(Archetype::Empath),
            Drive | Influence => Some(Archetype::Catalyst),
            _ => None,
        }
    }

    /// Native value range (currently uniform across the catalog).
    #[inline]
    pub const fn range(&self) -> (f32, f32) {
        (VALUE_MIN, VALUE_MAX)
    }

    /// All 50 parameters, hue first, catalog order.
    pub const fn all() -> [ParameterId; PARAMETER_COUNT] {
        use ParameterId::*;
        [
            Imagination,
            FutureOrientation,
            AnalyticalThinking,
            Curiosity,
            Loyalty,
            Dependability,
            Diplomacy,
            Cooperation,
            Adventurousness,
            Spontaneity,
            CreativeExpression,
            Originality,
            Compassion,
            EmotionalAttunement,
            Drive,
            Influence,
            Assertiveness,
            Sociability,
            Expressiveness,
            Leadership,
            Confidence,
            Independence,
            Optimism,
            Discipline,
            Adaptability,
            Humor,
            Ambition,
            Openness,
            Patience,
            Resilience,
            Pragmatism,
            Decisiveness,
            Playfulness,
            SelfAwareness,
            Introspection,
            Authenticity,
            MeaningSeeking,
            EmotionalDepth,
            Vulnerability,
            SpiritualOpenness,
            MoralConviction,
            Gratitude,
            Forgiveness,
            InnerCalm,
            Wonder,
            ComfortWithSolitude,
            MortalityAwareness,
            Transcendence,
            DepthOfReflection,
            ValuesClarity,
        ]
    }

    /// Parameters belonging to the given dimension, catalog order.
    pub fn in_dimension(dimension: Dimension) -> impl Iterator<Item = ParameterId> {
        Self::all()
            .into_iter()
            .filter(move |p| p.dimension() == dimension)
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Live state of one materialized parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterData {
    /// Current value on the native `[0, 100]` scale.
    pub value: f32,
    /// Trust in the current value, `[0, 1]`.
    pub confidence: f32,
    /// Plausible value interval given current confidence, clamped to the
    /// declared range: `value ± (1 - confidence) * 50`.
    pub prob_range: (f32, f32),
    /// Timestamp of the last signal that touched this parameter.
    pub last_updated: DateTime<Utc>,
    /// Source texts that contributed to the current value.
    pub contributing_cues: Vec<String>,
}

impl ParameterData {
    /// A freshly materialized parameter: mid-scale value, zero confidence.
    pub fn neutral(now: DateTime<Utc>) -> Self {
        Self {
            value: VALUE_NEUTRAL,
            confidence: 0.0,
            prob_range: (VALUE_MIN, VALUE_MAX),
            last_updated: now,
            contributing_cues: Vec::new(),
        }
    }

    /// Recompute `prob_range` from the current value and confidence.
    pub fn refresh_prob_range(&mut self, id: ParameterId) {
        let (lo, hi) = id.range();
        let half_width = (1.0 - self.confidence) * 50.0;
        self.prob_range = (
            (self.value - half_width).max(lo),
            (self.value + half_width).min(hi),
        );
    }

    /// Hours elapsed since the last signal update.
    pub fn hours_since_update(&self, now: DateTime<Utc>) -> f32 {
        let seconds = (now - self.last_updated).num_seconds();
        (seconds.max(0) as f32) / 3600.0
    }
}
