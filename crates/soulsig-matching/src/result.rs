//! Match records and per-run metrics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use soulsig_core::types::SubjectId;

use crate::options::HarmonyZone;

/// Coarse characterization of a ranked match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Nearly coincident signatures.
    Mirror,
    /// Same neighborhood, strong alignment.
    Kindred,
    /// Opposite-archetype pairing that balances.
    Complementary,
    /// Distant but retained; growth potential.
    Growth,
}

/// Per-axis alignment scores, each `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerAxisAlignment {
    pub hue: f32,
    pub manifested: f32,
    pub soul: f32,
}

/// Raw distances behind a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchDistances {
    /// Circular hue distance in degrees.
    pub hue: f32,
    /// Absolute manifested distance.
    pub manifested: f32,
    /// Absolute soul distance.
    pub soul: f32,
    /// Combined weighted distance.
    pub weighted: f32,
}

/// Score decomposition for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    /// Dimensional (signature-distance) score, `[0, 100]`.
    pub dimensional: f32,
    /// Parameter-level compatibility, `[0, 100]`, when both subjects'
    /// parameter data were available.
    pub parameter_level: Option<f32>,
    /// Extra score granted by the complementary boost.
    pub complementarity: f32,
    /// Alignment per axis.
    pub per_axis_alignment: PerAxisAlignment,
    /// True when a hard constraint zeroed this candidate out.
    pub veto_violation: bool,
}

/// One scored candidate.
///
/// Created fresh per query; the dimensional core is cached by
/// `(seeker_signature, candidate_signature, config_version)` since it is
/// a pure function of the two signatures plus configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityMatch {
    /// The matched candidate.
    pub candidate_id: SubjectId,
    /// Final blended (and possibly boosted) score, `[0, 100]`.
    pub score: f32,
    /// Score decomposition.
    pub breakdown: MatchBreakdown,
    /// Raw distances.
    pub distances: MatchDistances,
    /// Coarse match characterization.
    pub match_type: MatchType,
    /// Score-band bucket.
    pub harmony_zone: HarmonyZone,
    /// True when the complementary boost applied.
    pub is_complementary: bool,
    /// 1 for a valid match, 0 when vetoed.
    pub veto_factor: f32,
    /// Terse machine-readable reason tag.
    pub reason: String,
}

/// Run metrics attached to every result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Wall-clock time for the whole pipeline run.
    pub search_time: Duration,
    /// Candidates returned by the dimensional filter (stage 1).
    pub candidates_dimensional: usize,
    /// Candidates surviving the veto filter (stage 2).
    pub candidates_after_veto: usize,
    /// Candidates surviving scoring and `min_compatibility` (stage 3).
    pub candidates_scored: usize,
    /// Candidates surviving the zone filter (stage 4).
    pub candidates_after_zones: usize,
    /// Matches returned after truncation.
    pub returned: usize,
    /// Mean score of returned matches (0 when empty).
    pub average_score: f32,
    /// Best returned score (0 when empty).
    pub top_score: f32,
    /// Compatibility-cache hits during scoring.
    pub cache_hits: u64,
    /// Compatibility-cache misses during scoring.
    pub cache_misses: u64,
}

/// Ranked matches plus run metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingResult {
    /// Matches sorted by descending score.
    pub matches: Vec<CompatibilityMatch>,
    /// Per-stage accounting.
    pub metrics: MatchMetrics,
}

impl MatchingResult {
    /// True when the query completed but nothing qualified.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
