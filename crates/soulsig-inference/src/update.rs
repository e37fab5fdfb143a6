//! Parameter update math.
//!
//! Pure functions, separated from the engine so the update semantics
//! are testable without an analyzer or a store.

use chrono::{DateTime, Utc};

use soulsig_core::config::InferenceConfig;
use soulsig_core::types::{ParameterData, ParameterId};

/// One signal's contribution to a parameter, derived from the analyzer
/// output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalUpdate {
    /// Observed value on the parameter's native scale.
    pub observed_value: f32,
    /// Weight of the observation against the prior.
    pub influence_weight: f32,
}

/// What applying a signal did to a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalOutcome {
    /// Value delta.
    pub contribution: f32,
    /// Confidence delta (negative under contradiction damping).
    pub confidence_gain: f32,
    /// True when contradiction damping fired.
    pub contradicted: bool,
}

/// Derive a [`SignalUpdate`] from an indicator strength and the
/// analyzer's sentiment confidence.
///
/// The observed value is the strength projected onto the native scale;
/// the influence weight is the strength discounted by the analyzer's
/// own confidence, floored so a low-confidence reading still moves a
/// parameter slowly rather than not at all.
pub fn derive_update(id: ParameterId, strength: f32, analyzer_confidence: f32) -> SignalUpdate {
    let (lo, hi) = id.range();
    let span = hi - lo;
    SignalUpdate {
        observed_value: (lo + strength.clamp(0.0, 1.0) * span).clamp(lo, hi),
        influence_weight: (strength.clamp(0.0, 1.0) * analyzer_confidence.clamp(0.0, 1.0))
            .max(0.1),
    }
}

/// Apply one signal to a parameter.
///
/// - New value: confidence-weighted average of the prior `(value,
///   confidence)` and the observation `(observed_value, influence_weight)`.
/// - New confidence: `min(1, confidence + influence_weight * gain_factor)`.
/// - Contradiction: when the prior confidence exceeds 0.5 and the
///   observation swings more than the configured threshold, both the
///   prior and the incoming confidence are damped (×0.8 by default) and
///   no additive gain applies - trust strictly decreases but the
///   observation is never rejected.
/// - `prob_range` is recomputed as `value ± (1-confidence)*50`, clamped
///   to the declared range.
pub fn apply_signal(
    data: &mut ParameterData,
    id: ParameterId,
    update: SignalUpdate,
    source_text: &str,
    now: DateTime<Utc>,
    config: &InferenceConfig,
) -> SignalOutcome {
    let old_value = data.value;
    let old_confidence = data.confidence;

    let mut weight = update.influence_weight;
    let contradicted = data.confidence > 0.5
        && (update.observed_value - data.value).abs() > config.contradiction_threshold;
    if contradicted {
        data.confidence *= config.contradiction_damping;
        weight *= config.contradiction_damping;
    }

    let denominator = data.confidence + weight;
    if denominator > 0.0 {
        data.value = (data.value * data.confidence + update.observed_value * weight) / denominator;
    }
    let (lo, hi) = id.range();
    data.value = data.value.clamp(lo, hi);

    if !contradicted {
        data.confidence =
            (data.confidence + weight * config.confidence_gain_factor).min(1.0);
    }

    data.refresh_prob_range(id);
    data.last_updated = now;
    data.contributing_cues.push(source_text.to_string());

    SignalOutcome {
        contribution: data.value - old_value,
        confidence_gain: data.confidence - old_confidence,
        contradicted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> ParameterData {
        ParameterData::neutral(Utc::now())
    }

    fn config() -> InferenceConfig {
        InferenceConfig::default()
    }

    #[test]
    fn derive_projects_strength_onto_native_scale() {
        let update = derive_update(ParameterId::Curiosity, 0.8, 0.8);
        assert_eq!(update.observed_value, 80.0);
        assert!((update.influence_weight - 0.64).abs() < 1e-6);
    }

    #[test]
    fn derive_floors_the_influence_weight() {
        let update = derive_update(ParameterId::Curiosity, 0.05, 0.1);
        assert_eq!(update.influence_weight, 0.1);
    }

    #[test]
    fn first_signal_pulls_value_to_the_observation() {
        let mut data = fresh();
        let update = SignalUpdate {
            observed_value: 80.0,
            influence_weight: 0.6,
        };
        // Prior confidence is 0, so the observation dominates entirely.
        apply_signal(&mut data, ParameterId::Curiosity, update, "msg", Utc::now(), &config());
        assert!((data.value - 80.0).abs() < 1e-4);
        assert!((data.confidence - 0.3).abs() < 1e-6);
    }

    #[test]
    fn repeated_positive_signals_strictly_increase_confidence_toward_one() {
        let mut data = fresh();
        let update = SignalUpdate {
            observed_value: 80.0,
            influence_weight: 0.6,
        };
        let mut previous = data.confidence;
        for i in 0..50 {
            apply_signal(&mut data, ParameterId::Curiosity, update, "msg", Utc::now(), &config());
            assert!(data.confidence <= 1.0, "confidence exceeded 1 at step {i}");
            if previous < 1.0 {
                assert!(
                    data.confidence > previous,
                    "confidence did not increase at step {i}"
                );
            }
            previous = data.confidence;
        }
        assert_eq!(data.confidence, 1.0);
        assert!((data.value - 80.0).abs() < 1e-3);
    }

    #[test]
    fn contradictions_strictly_decrease_confidence_never_below_zero() {
        let mut data = fresh();
        data.value = 80.0;
        data.confidence = 0.9;

        // Swings of more than 30 against a confident prior.
        let contradiction = SignalUpdate {
            observed_value: 20.0,
            influence_weight: 0.6,
        };
        let mut previous = data.confidence;
        for i in 0..20 {
            let outcome = apply_signal(
                &mut data,
                ParameterId::Curiosity,
                contradiction,
                "msg",
                Utc::now(),
                &config(),
            );
            if !outcome.contradicted {
                // The prior eventually drifts toward the observation or
                // confidence drops to 0.5; damping only fires while both
                // contradiction conditions hold.
                break;
            }
            assert!(
                data.confidence < previous,
                "confidence did not decrease at step {i}"
            );
            assert!(data.confidence >= 0.0);
            assert!(outcome.confidence_gain < 0.0);
            previous = data.confidence;
        }
        assert!(data.confidence < 0.9);
    }

    #[test]
    fn contradiction_never_rejects_the_observation() {
        let mut data = fresh();
        data.value = 80.0;
        data.confidence = 0.9;

        let contradiction = SignalUpdate {
            observed_value: 20.0,
            influence_weight: 0.6,
        };
        let outcome = apply_signal(
            &mut data,
            ParameterId::Curiosity,
            contradiction,
            "msg",
            Utc::now(),
            &config(),
        );
        assert!(outcome.contradicted);
        assert!(data.value < 80.0, "observed value must still blend in");
    }

    #[test]
    fn small_swings_against_confident_priors_are_not_contradictions() {
        let mut data = fresh();
        data.value = 80.0;
        data.confidence = 0.9;

        let nearby = SignalUpdate {
            observed_value: 70.0,
            influence_weight: 0.6,
        };
        let outcome = apply_signal(
            &mut data,
            ParameterId::Curiosity,
            nearby,
            "msg",
            Utc::now(),
            &config(),
        );
        assert!(!outcome.contradicted);
        assert!(data.confidence > 0.9);
    }

    #[test]
    fn prob_range_tracks_confidence() {
        let mut data = fresh();
        let update = SignalUpdate {
            observed_value: 90.0,
            influence_weight: 1.0,
        };
        apply_signal(&mut data, ParameterId::Curiosity, update, "msg", Utc::now(), &config());
        let (lo, hi) = data.prob_range;
        assert!(lo >= 0.0 && hi <= 100.0);
        assert!(lo <= data.value && data.value <= hi);
        let expected_half_width = (1.0 - data.confidence) * 50.0;
        assert!((hi.min(100.0) - data.value) <= expected_half_width + 1e-4);
    }

    #[test]
    fn cues_accumulate() {
        let mut data = fresh();
        let update = SignalUpdate {
            observed_value: 70.0,
            influence_weight: 0.5,
        };
        apply_signal(&mut data, ParameterId::Curiosity, update, "first", Utc::now(), &config());
        apply_signal(&mut data, ParameterId::Curiosity, update, "second", Utc::now(), &config());
        assert_eq!(data.contributing_cues, vec!["first", "second"]);
    }
}
