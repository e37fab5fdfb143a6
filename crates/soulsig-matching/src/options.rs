//! Query options for a matching run.

use serde::{Deserialize, Serialize};

use soulsig_core::error::{CoreError, CoreResult};
use soulsig_core::types::{Archetype, SubjectId, LINEAR_MAX};

/// Score-banded harmony buckets used for coarse filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonyZone {
    /// Score ≥ 80.
    Inner,
    /// Score ≥ 60.
    Middle,
    /// Score ≥ 40.
    Outer,
    /// Everything below 40.
    Excluded,
}

impl HarmonyZone {
    /// Bucket a score into its zone.
    #[inline]
    pub fn for_score(score: f32) -> Self {
        if score >= 80.0 {
            Self::Inner
        } else if score >= 60.0 {
            Self::Middle
        } else if score >= 40.0 {
            Self::Outer
        } else {
            Self::Excluded
        }
    }

    /// The zones a caller gets when requesting none explicitly.
    #[inline]
    pub const fn default_set() -> [HarmonyZone; 3] {
        [Self::Inner, Self::Middle, Self::Outer]
    }
}

/// Options for one matching query.
///
/// # Examples
///
/// ```
/// use soulsig_matching::{HarmonyZone, MatchingOptions};
/// use soulsig_core::types::Archetype;
///
/// let options = MatchingOptions::new(20)
///     .with_min_compatibility(55.0)
///     .with_preferred_archetypes(vec![Archetype::Cognitive])
///     .with_harmony_zones(vec![HarmonyZone::Inner, HarmonyZone::Middle]);
/// assert_eq!(options.max_results, 20);
/// options.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingOptions {
    /// Minimum blended score to survive ranking, `[0, 100]`.
    pub min_compatibility: f32,
    /// Maximum matches returned.
    pub max_results: usize,
    /// Widen the search to the opposite-archetype sector and enable the
    /// complementary boost path.
    pub include_complementary: bool,
    /// When non-empty, only these archetypes survive the veto filter.
    pub preferred_archetypes: Vec<Archetype>,
    /// Archetypes vetoed outright.
    pub excluded_archetypes: Vec<Archetype>,
    /// Hard bound on the candidate's soul coordinate.
    pub soul_depth_range: Option<(f32, f32)>,
    /// Hard bound on the candidate's manifested coordinate.
    pub manifested_range: Option<(f32, f32)>,
    /// Zones to keep; empty means all non-excluded zones.
    pub harmony_zones: Vec<HarmonyZone>,
    /// Candidate ids vetoed outright (e.g. already seen). Ids not in the
    /// pool are ignored, not fatal.
    pub excluded_candidates: Vec<SubjectId>,
}

impl MatchingOptions {
    /// Create options with the given result cap and permissive defaults.
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results,
            ..Default::default()
        }
    }

    /// Set the minimum compatibility score.
    pub fn with_min_compatibility(mut self, min: f32) -> Self {
        self.min_compatibility = min;
        self
    }

    /// Request complementary matches.
    pub fn with_complementary(mut self) -> Self {
        self.include_complementary = true;
        self
    }

    /// Restrict to the given archetypes.
    pub fn with_preferred_archetypes(mut self, archetypes: Vec<Archetype>) -> Self {
        self.preferred_archetypes = archetypes;
        self
    }

    /// Veto the given archetypes.
    pub fn with_excluded_archetypes(mut self, archetypes: Vec<Archetype>) -> Self {
        self.excluded_archetypes = archetypes;
        self
    }

    /// Bound the candidate's soul coordinate.
    pub fn with_soul_depth_range(mut self, lo: f32, hi: f32) -> Self {
        self.soul_depth_range = Some((lo, hi));
        self
    }

    /// Bound the candidate's manifested coordinate.
    pub fn with_manifested_range(mut self, lo: f32, hi: f32) -> Self {
        self.manifested_range = Some((lo, hi));
        self
    }

    /// Keep only the given zones.
    pub fn with_harmony_zones(mut self, zones: Vec<HarmonyZone>) -> Self {
        self.harmony_zones = zones;
        self
    }

    /// Veto specific candidate ids.
    pub fn with_excluded_candidates(mut self, ids: Vec<SubjectId>) -> Self {
        self.excluded_candidates = ids;
        self
    }

    /// The effective zone set (empty request means all non-excluded).
    pub fn effective_zones(&self) -> Vec<HarmonyZone> {
        if self.harmony_zones.is_empty() {
            HarmonyZone::default_set().to_vec()
        } else {
            self.harmony_zones.clone()
        }
    }

    /// Fail fast on malformed options.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=100.0).contains(&self.min_compatibility) {
            return Err(CoreError::ValidationError {
                field: "min_compatibility".to_string(),
                message: format!("must be in [0, 100], got {}", self.min_compatibility),
            });
        }
        if self.max_results == 0 {
            return Err(CoreError::ValidationError {
                field: "max_results".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        for (field, range) in [
            ("soul_depth_range", self.soul_depth_range),
            ("manifested_range", self.manifested_range),
        ] {
            if let Some((lo, hi)) = range {
                if !lo.is_finite() || !hi.is_finite() || lo > hi || lo < 0.0 || hi > LINEAR_MAX {
                    return Err(CoreError::ValidationError {
                        field: field.to_string(),
                        message: format!("must be an ordered sub-range of [0, 255], got [{lo}, {hi}]"),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_bucketing_uses_inclusive_boundaries() {
        assert_eq!(HarmonyZone::for_score(100.0), HarmonyZone::Inner);
        assert_eq!(HarmonyZone::for_score(80.0), HarmonyZone::Inner);
        assert_eq!(HarmonyZone::for_score(79.9), HarmonyZone::Middle);
        assert_eq!(HarmonyZone::for_score(60.0), HarmonyZone::Middle);
        assert_eq!(HarmonyZone::for_score(59.9), HarmonyZone::Outer);
        assert_eq!(HarmonyZone::for_score(40.0), HarmonyZone::Outer);
        assert_eq!(HarmonyZone::for_score(39.9), HarmonyZone::Excluded);
        assert_eq!(HarmonyZone::for_score(0.0), HarmonyZone::Excluded);
    }

    #[test]
    fn empty_zone_request_means_all_non_excluded() {
        let options = MatchingOptions::new(10);
        assert_eq!(
            options.effective_zones(),
            vec![HarmonyZone::Inner, HarmonyZone::Middle, HarmonyZone::Outer]
        );

        let options = MatchingOptions::new(10).with_harmony_zones(vec![HarmonyZone::Excluded]);
        assert_eq!(options.effective_zones(), vec![HarmonyZone::Excluded]);
    }

    #[test]
    fn validate_rejects_bad_options() {
        assert!(MatchingOptions::new(0).validate().is_err());
        assert!(MatchingOptions::new(10)
            .with_min_compatibility(120.0)
            .validate()
            .is_err());
        assert!(MatchingOptions::new(10)
            .with_soul_depth_range(200.0, 100.0)
            .validate()
            .is_err());
        assert!(MatchingOptions::new(10)
            .with_manifested_range(-5.0, 100.0)
            .validate()
            .is_err());
        assert!(MatchingOptions::new(10).validate().is_ok());
    }
}
