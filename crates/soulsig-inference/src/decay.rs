//! Temporal confidence decay.
//!
//! Evidence goes stale: a parameter that has not been touched by any
//! signal for longer than the configured idle window loses confidence
//! exponentially, `confidence *= decay_rate ^ (hours_since_update / 24)`.
//! Decay only ever reduces confidence and never touches the value or
//! the update timestamp - the parameter stays where it was, we just
//! trust it less.

use chrono::{DateTime, Utc};

use soulsig_core::config::InferenceConfig;
use soulsig_core::types::{ParameterData, ParameterId};

/// Apply temporal decay to one parameter.
///
/// Returns the (non-positive) confidence delta; 0 when the parameter is
/// inside the idle window.
pub fn decay_confidence(
    data: &mut ParameterData,
    id: ParameterId,
    now: DateTime<Utc>,
    config: &InferenceConfig,
) -> f32 {
    let hours = data.hours_since_update(now);
    if hours <= config.decay_idle_hours {
        return 0.0;
    }
    let before = data.confidence;
    let factor = config.decay_rate.powf(hours / 24.0);
    data.confidence *= factor.clamp(0.0, 1.0);
    data.refresh_prob_range(id);
    data.confidence - before
}
