//! Parameter snapshots for the parameter-level scoring term.
//!
//! The pipeline only ever reads a derived view of a subject; when both
//! the seeker's and a candidate's parameter snapshots are available, the
//! blended score adds a parameter-level compatibility term. A missing
//! snapshot is not an error - the score falls back to purely
//! dimensional.

use dashmap::DashMap;
use std::collections::BTreeMap;

use soulsig_core::types::{ParameterData, ParameterId, SubjectId};

/// Read-only source of parameter snapshots.
pub trait ParameterProvider: Send + Sync {
    /// Snapshot for a subject, `None` when unavailable.
    fn parameters_for(&self, id: &SubjectId) -> Option<BTreeMap<ParameterId, ParameterData>>;
}

/// Provider over an in-process map, fed by the calling layer.
#[derive(Debug, Default)]
pub struct StaticParameterProvider {
    snapshots: DashMap<SubjectId, BTreeMap<ParameterId, ParameterData>>,
}

impl StaticParameterProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or replace) a subject's snapshot.
    pub fn publish(&self, id: SubjectId, parameters: BTreeMap<ParameterId, ParameterData>) {
        self.snapshots.insert(id, parameters);
    }

    /// Drop a subject's snapshot.
    pub fn retract(&self, id: &SubjectId) {
        self.snapshots.remove(id);
    }
}

impl ParameterProvider for StaticParameterProvider {
    fn parameters_for(&self, id: &SubjectId) -> Option<BTreeMap<ParameterId, ParameterData>> {
        self.snapshots.get(id).map(|entry| entry.clone())
    }
}

/// Weighted mean of per-parameter similarity over parameters present in
/// both snapshots.
///
/// Similarity per parameter is `1 - |va - vb| / 100` on the native
/// scale, weighted by the catalog weight. Returns `None` when the
/// snapshots share no parameters.
pub(crate) fn parameter_similarity(
    a: &BTreeMap<ParameterId, ParameterData>,
    b: &BTreeMap<ParameterId, ParameterData>,
) -> Option<f32> {
    let mut weighted_sum = 0.0_f32;
    let mut weight_total = 0.0_f32;
    for (id, data_a) in a {
        let Some(data_b) = b.get(id) else {
            continue;
        };
        let (lo, hi) = id.range();
        let span = hi - lo;
        let similarity = 1.0 - ((data_a.value - data_b.value).abs() / span).clamp(0.0, 1.0);
        let weight = id.weight();
        weighted_sum += similarity * weight;
        weight_total += weight;
    }
    if weight_total == 0.0 {
        None
    } else {
        Some((weighted_sum / weight_total).clamp(0.0, 1.0))
    }
}
