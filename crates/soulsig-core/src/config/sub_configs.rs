//! Sub-configuration types for each subsystem.

use serde::{Deserialize, Serialize};

use crate::distance::{AxisWeights, DistanceMetric};
use crate::error::{CoreError, CoreResult};
use crate::types::PhaseThresholds;

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive (e.g. "info", "soulsig_matching=debug").
    pub level: String,
    /// Emit JSON-formatted log lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Spatial index configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Tombstone-to-total ratio above which a rebuild is recommended.
    pub rebuild_tombstone_ratio: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            rebuild_tombstone_ratio: 0.25,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.rebuild_tombstone_ratio) {
            return Err(CoreError::ConfigurationError(format!(
                "index.rebuild_tombstone_ratio must be in [0, 1], got {}",
                self.rebuild_tombstone_ratio
            )));
        }
        Ok(())
    }
}

/// Matching pipeline configuration.
///
/// `version` participates in the compatibility-cache key; bump it when
/// tuning any scoring parameter so stale cached scores are not reused.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Per-axis weights for the weighted distance.
    pub weights: AxisWeights,
    /// Metric combining the weighted axes.
    pub metric: DistanceMetric,
    /// Distance mapping to score 0.
    pub max_distance: f32,
    /// Share of the blended score taken by the dimensional term
    /// (the remainder is the parameter-level term when available).
    pub dimensional_blend: f32,
    /// Hue box padding in degrees for the dimensional filter.
    pub hue_padding: f32,
    /// Widened hue padding when complementary matches are requested.
    pub hue_padding_complementary: f32,
    /// Score multiplier for complementary-pair matches.
    pub complementary_boost: f32,
    /// Both linear deltas must stay below this for the boost to apply.
    pub complementary_linear_delta_max: f32,
    /// Bounded capacity of the compatibility cache.
    pub cache_capacity: u64,
    /// Scoring-configuration version, part of the cache key.
    pub version: u64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: AxisWeights::default(),
            metric: DistanceMetric::Euclidean,
            max_distance: 500.0,
            dimensional_blend: 0.6,
            hue_padding: 45.0,
            hue_padding_complementary: 60.0,
            complementary_boost: 1.2,
            complementary_linear_delta_max: 100.0,
            cache_capacity: 10_000,
            version: 1,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_distance <= 0.0 || !self.max_distance.is_finite() {
            return Err(CoreError::ConfigurationError(format!(
                "matching.max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if !(0.0..=1.0).contains(&self.dimensional_blend) {
            return Err(CoreError::ConfigurationError(format!(
                "matching.dimensional_blend must be in [0, 1], got {}",
                self.dimensional_blend
            )));
        }
        for (name, padding) in [
            ("hue_padding", self.hue_padding),
            ("hue_padding_complementary", self.hue_padding_complementary),
        ] {
            if !(0.0..=180.0).contains(&padding) {
                return Err(CoreError::ConfigurationError(format!(
                    "matching.{name} must be in [0, 180], got {padding}"
                )));
            }
        }
        if self.complementary_boost < 1.0 {
            return Err(CoreError::ConfigurationError(format!(
                "matching.complementary_boost must be >= 1, got {}",
                self.complementary_boost
            )));
        }
        Ok(())
    }
}

/// Inference engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Timeout on the external analyzer call, milliseconds. On expiry the
    /// message degrades to zero signal instead of blocking the pipeline.
    pub analyzer_timeout_ms: u64,
    /// Per-24h confidence decay factor for idle parameters.
    pub decay_rate: f32,
    /// Idle hours before decay starts applying.
    pub decay_idle_hours: f32,
    /// Minimum parameter confidence admitted to the hue circular mean.
    pub min_confidence: f32,
    /// Value swing (native scale) that counts as a contradiction.
    pub contradiction_threshold: f32,
    /// Confidence multiplier applied to both sides of a contradiction.
    pub contradiction_damping: f32,
    /// Confidence gained per unit influence weight.
    pub confidence_gain_factor: f32,
    /// Message-count thresholds for phase transitions.
    pub phase_thresholds: PhaseThresholds,
    /// Number of low-confidence parameters returned as question targets.
    pub next_question_count: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            analyzer_timeout_ms: 5_000,
            decay_rate: 0.95,
            decay_idle_hours: 24.0,
            min_confidence: 0.2,
            contradiction_threshold: 30.0,
            contradiction_damping: 0.8,
            confidence_gain_factor: 0.5,
            phase_thresholds: PhaseThresholds::default(),
            next_question_count: 5,
        }
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0 < self.decay_rate && self.decay_rate <= 1.0) {
            return Err(CoreError::ConfigurationError(format!(
                "inference.decay_rate must be in (0, 1], got {}",
                self.decay_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(CoreError::ConfigurationError(format!(
                "inference.min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.contradiction_damping) {
            return Err(CoreError::ConfigurationError(format!(
                "inference.contradiction_damping must be in [0, 1], got {}",
                self.contradiction_damping
            )));
        }
        let t = &self.phase_thresholds;
        if !(t.surface_max < t.layer_peeling_max && t.layer_peeling_max < t.core_excavation_max) {
            return Err(CoreError::ConfigurationError(format!(
                "inference.phase_thresholds must be strictly increasing, got {} / {} / {}",
                t.surface_max, t.layer_peeling_max, t.core_excavation_max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_values_are_rejected() {
        let mut matching = MatchingConfig::default();
        matching.max_distance = 0.0;
        assert!(matching.validate().is_err());

        let mut matching = MatchingConfig::default();
        matching.dimensional_blend = 1.5;
        assert!(matching.validate().is_err());

        let mut inference = InferenceConfig::default();
        inference.decay_rate = 0.0;
        assert!(inference.validate().is_err());

        let mut inference = InferenceConfig::default();
        inference.phase_thresholds.layer_peeling_max = 10;
        assert!(inference.validate().is_err());
    }
}
