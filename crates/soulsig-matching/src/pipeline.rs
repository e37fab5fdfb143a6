//! The five-stage matching pipeline.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{debug, instrument};

use soulsig_core::codec;
use soulsig_core::config::MatchingConfig;
use soulsig_core::distance::{axis_distances, score_from_distance, weighted_distance};
use soulsig_core::error::{CoreError, CoreResult};
use soulsig_core::types::{PersonalityPoint, Signature, SubjectId, SubjectProfile, HUE_MODULUS};
use soulsig_index::{CandidateEntry, SpatialIndex};

use crate::cache::{CacheKey, CompatibilityCache, ScoredPair};
use crate::options::{HarmonyZone, MatchingOptions};
use crate::provider::{parameter_similarity, ParameterProvider};
use crate::result::{
    CompatibilityMatch, MatchBreakdown, MatchDistances, MatchMetrics, MatchType, MatchingResult,
    PerAxisAlignment,
};

/// The derived seeker view the pipeline reads.
///
/// The matching layer never touches a full `SubjectProfile`; this is the
/// `(id, point, signature)` projection it needs.
#[derive(Debug, Clone, Copy)]
pub struct SeekerView {
    /// Seeker identifier.
    pub id: SubjectId,
    /// Seeker position.
    pub point: PersonalityPoint,
    /// Seeker signature.
    pub signature: Signature,
}

impl From<&SubjectProfile> for SeekerView {
    fn from(profile: &SubjectProfile) -> Self {
        Self {
            id: profile.subject_id,
            point: profile.point,
            signature: profile.signature,
        }
    }
}

/// Five-stage batch matching pipeline.
///
/// Stages per query: dimensional filter → veto filter → score & rank →
/// harmony-zone filter → complementary boost. The veto stage is a pure
/// membership filter - it never adjusts scores. Queries take a read
/// lock on the shared index; inserts happen off the query path.
pub struct MatchingPipeline {
    index: Option<Arc<RwLock<SpatialIndex>>>,
    config: MatchingConfig,
    cache: CompatibilityCache,
    parameters: Option<Arc<dyn ParameterProvider>>,
}

impl MatchingPipeline {
    /// Create a pipeline with no index attached.
    ///
    /// [`MatchingPipeline::find_matches`] fails with a
    /// `ConfigurationError` until an index is attached.
    pub fn new(config: MatchingConfig) -> Self {
        let cache = CompatibilityCache::new(config.cache_capacity);
        Self {
            index: None,
            config,
            cache,
            parameters: None,
        }
    }

    /// Attach the shared candidate index.
    pub fn with_index(mut self, index: Arc<RwLock<SpatialIndex>>) -> Self {
        self.index = Some(index);
        self
    }

    /// Attach a parameter snapshot source for the parameter-level term.
    pub fn with_parameter_provider(mut self, provider: Arc<dyn ParameterProvider>) -> Self {
        self.parameters = Some(provider);
        self
    }

    /// The compatibility cache (for stats inspection).
    pub fn cache(&self) -> &CompatibilityCache {
        &self.cache
    }

    /// Run the full pipeline for one seeker.
    ///
    /// # Errors
    ///
    /// - [`CoreError::ConfigurationError`] when no index is attached
    /// - [`CoreError::ValidationError`] on malformed options
    /// - [`CoreError::IndexError`] on index failures (surfaced, fail fast)
    #[instrument(skip(self, seeker, options), fields(seeker = %seeker.id))]
    pub fn find_matches(
        &self,
        seeker: &SeekerView,
        options: &MatchingOptions,
    ) -> CoreResult<MatchingResult> {
        let started = Instant::now();
        options.validate()?;

        let index = self.index.as_ref().ok_or_else(|| {
            CoreError::ConfigurationError("matching invoked before an index was attached".into())
        })?;

        let stats = self.cache.stats();
        let (hits_before, misses_before) = (stats.hits(), stats.misses());

        // Stage 1: dimensional filter.
        let candidates = self.dimensional_filter(index, seeker, options)?;
        let candidates_dimensional = candidates.len();

        // Stage 2: veto filter - membership only, never score adjustment.
        let survivors: Vec<&CandidateEntry> = candidates
            .iter()
            .filter(|candidate| self.veto_reason(candidate, options).is_none())
            .collect();
        let candidates_after_veto = survivors.len();

        // Stage 3: score and rank.
        let mut scored: Vec<CompatibilityMatch> = survivors
            .iter()
            .map(|candidate| self.score_candidate(seeker, candidate))
            .filter(|m| m.score >= options.min_compatibility)
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.candidate_id.cmp(&b.candidate_id))
        });
        let candidates_scored = scored.len();

        // Stage 4: harmony-zone filter.
        let zones = options.effective_zones();
        scored.retain(|m| zones.contains(&m.harmony_zone));
        let candidates_after_zones = scored.len();

        // Stage 5: complementary boost.
        let points: std::collections::HashMap<SubjectId, PersonalityPoint> =
            candidates.iter().map(|c| (c.id, c.point)).collect();
        for entry in &mut scored {
            if let Some(candidate_point) = points.get(&entry.candidate_id) {
                self.apply_complementary_boost(seeker, candidate_point, entry);
            }
        }
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.candidate_id.cmp(&b.candidate_id))
        });

        scored.truncate(options.max_results);

        let returned = scored.len();
        let top_score = scored.first().map_or(0.0, |m| m.score);
        let average_score = if scored.is_empty() {
            0.0
        } else {
            scored.iter().map(|m| m.score).sum::<f32>() / scored.len() as f32
        };

        let metrics = MatchMetrics {
            search_time: started.elapsed(),
            candidates_dimensional,
            candidates_after_veto,
            candidates_scored,
            candidates_after_zones,
            returned,
            average_score,
            top_score,
            cache_hits: stats.hits() - hits_before,
            cache_misses: stats.misses() - misses_before,
        };

        debug!(
            dimensional = candidates_dimensional,
            after_veto = candidates_after_veto,
            scored = candidates_scored,
            after_zones = candidates_after_zones,
            returned,
            top_score,
            "matching pipeline complete"
        );

        Ok(MatchingResult {
            matches: scored,
            metrics,
        })
    }

    /// Score one candidate against a seeker, veto-aware.
    ///
    /// A vetoed candidate yields `score = 0`, `veto_factor = 0`, and
    /// `breakdown.veto_violation = true` regardless of dimensional
    /// proximity; the ranked pipeline drops such candidates at stage 2.
    pub fn evaluate_candidate(
        &self,
        seeker: &SeekerView,
        candidate: &CandidateEntry,
        options: &MatchingOptions,
    ) -> CompatibilityMatch {
        if let Some(reason) = self.veto_reason(candidate, options) {
            let pair = self.scored_pair(&seeker.signature, &candidate.signature);
            return CompatibilityMatch {
                candidate_id: candidate.id,
                score: 0.0,
                breakdown: MatchBreakdown {
                    dimensional: pair.dimensional,
                    parameter_level: None,
                    complementarity: 0.0,
                    per_axis_alignment: pair.per_axis,
                    veto_violation: true,
                },
                distances: pair.distances,
                match_type: MatchType::Growth,
                harmony_zone: HarmonyZone::Excluded,
                is_complementary: false,
                veto_factor: 0.0,
                reason: format!("veto:{reason}"),
            };
        }
        self.score_candidate(seeker, candidate)
    }

    // ------------------------------------------------------------------
    // Stage 1
    // ------------------------------------------------------------------

    fn dimensional_filter(
        &self,
        index: &Arc<RwLock<SpatialIndex>>,
        seeker: &SeekerView,
        options: &MatchingOptions,
    ) -> CoreResult<Vec<CandidateEntry>> {
        let padding = if options.include_complementary {
            self.config.hue_padding_complementary
        } else {
            self.config.hue_padding
        };

        let mut hue_windows = split_hue_window(seeker.point.hue, padding);
        if options.include_complementary {
            // The widened search also covers the opposite-archetype
            // sector so stage 5 has candidates to boost.
            let opposite = (seeker.point.hue + 180.0) % HUE_MODULUS;
            hue_windows.extend(split_hue_window(
                opposite,
                self.config.hue_padding_complementary,
            ));
        }

        let manifested = clamp_window(options.manifested_range);
        let soul = clamp_window(options.soul_depth_range);

        let guard = index
            .read()
            .map_err(|_| CoreError::IndexError("spatial index lock poisoned".into()))?;

        let mut seen: HashSet<SubjectId> = HashSet::new();
        let mut collected = Vec::new();
        for window in hue_windows {
            let hits = guard
                .range_query(window, manifested, soul)
                .map_err(|e| CoreError::IndexError(e.to_string()))?;
            for entry in hits {
                if entry.id != seeker.id && seen.insert(entry.id) {
                    collected.push(entry.clone());
                }
            }
        }
        Ok(collected)
    }

    // ------------------------------------------------------------------
    // Stage 2
    // ------------------------------------------------------------------

    /// Why a candidate is vetoed, or `None` when it passes.
    fn veto_reason(
        &self,
        candidate: &CandidateEntry,
        options: &MatchingOptions,
    ) -> Option<&'static str> {
        if options.excluded_candidates.contains(&candidate.id) {
            return Some("excluded-candidate");
        }

        let archetype = codec::archetype_of(candidate.point.hue).archetype;
        if options.excluded_archetypes.contains(&archetype) {
            return Some("excluded-archetype");
        }
        if !options.preferred_archetypes.is_empty()
            && !options.preferred_archetypes.contains(&archetype)
        {
            return Some("outside-preferred-archetypes");
        }

        if let Some((lo, hi)) = options.manifested_range {
            if candidate.point.manifested < lo || candidate.point.manifested > hi {
                return Some("manifested-out-of-range");
            }
        }
        if let Some((lo, hi)) = options.soul_depth_range {
            if candidate.point.soul < lo || candidate.point.soul > hi {
                return Some("soul-out-of-range");
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Stage 3
    // ------------------------------------------------------------------

    /// The pure dimensional core, cached by signature pair.
    ///
    /// Distances are computed on the decoded (quantized) signature
    /// points so the cached value is a pure function of the two
    /// signatures plus the scoring configuration.
    fn scored_pair(&self, seeker: &Signature, candidate: &Signature) -> ScoredPair {
        let key = CacheKey {
            seeker: *seeker,
            candidate: *candidate,
            version: self.config.version,
        };
        if let Some(pair) = self.cache.get(&key) {
            return pair;
        }

        let a = codec::decode_signature(seeker);
        let b = codec::decode_signature(candidate);
        let axes = axis_distances(&a, &b);
        let weighted = weighted_distance(&a, &b, &self.config.weights, self.config.metric);
        let pair = ScoredPair {
            distances: MatchDistances {
                hue: axes.hue,
                manifested: axes.manifested,
                soul: axes.soul,
                weighted,
            },
            per_axis: PerAxisAlignment {
                hue: score_from_distance(axes.hue, 180.0),
                manifested: score_from_distance(axes.manifested, 255.0),
                soul: score_from_distance(axes.soul, 255.0),
            },
            dimensional: score_from_distance(weighted, self.config.max_distance),
        };
        self.cache.insert(key, pair);
        pair
    }

    fn score_candidate(&self, seeker: &SeekerView, candidate: &CandidateEntry) -> CompatibilityMatch {
        let pair = self.scored_pair(&seeker.signature, &candidate.signature);

        // Parameter-level term, when both snapshots are available.
        let parameter_level = self.parameters.as_ref().and_then(|provider| {
            let seeker_params = provider.parameters_for(&seeker.id)?;
            let candidate_params = provider.parameters_for(&candidate.id)?;
            parameter_similarity(&seeker_params, &candidate_params).map(|sim| sim * 100.0)
        });

        let score = match parameter_level {
            Some(param_score) => {
                let blend = self.config.dimensional_blend;
                pair.dimensional * blend + param_score * (1.0 - blend)
            }
            None => pair.dimensional,
        };

        let match_type = if pair.distances.weighted < 40.0 {
            MatchType::Mirror
        } else if score >= 60.0 {
            MatchType::Kindred
        } else {
            MatchType::Growth
        };
        let reason = match match_type {
            MatchType::Mirror => "mirror-signature".to_string(),
            MatchType::Kindred => "aligned-signature".to_string(),
            _ => "growth-pairing".to_string(),
        };

        CompatibilityMatch {
            candidate_id: candidate.id,
            score,
            breakdown: MatchBreakdown {
                dimensional: pair.dimensional,
                parameter_level,
                complementarity: 0.0,
                per_axis_alignment: pair.per_axis,
                veto_violation: false,
            },
            distances: pair.distances,
            match_type,
            harmony_zone: HarmonyZone::for_score(score),
            is_complementary: false,
            veto_factor: 1.0,
            reason,
        }
    }

    // ------------------------------------------------------------------
    // Stage 5
    // ------------------------------------------------------------------

    fn apply_complementary_boost(
        &self,
        seeker: &SeekerView,
        candidate_point: &PersonalityPoint,
        entry: &mut CompatibilityMatch,
    ) {
        let seeker_archetype = codec::archetype_of(seeker.point.hue).archetype;
        let partner = seeker_archetype.complement();

        if !partner.contains_hue(candidate_point.hue) {
            return;
        }
        let limit = self.config.complementary_linear_delta_max;
        if entry.distances.manifested >= limit || entry.distances.soul >= limit {
            return;
        }

        let before = entry.score;
        entry.score = (entry.score * self.config.complementary_boost).min(100.0);
        entry.breakdown.complementarity = entry.score - before;
        entry.is_complementary = true;
        entry.match_type = MatchType::Complementary;
        entry.harmony_zone = HarmonyZone::for_score(entry.score);
        entry.reason = format!("complementary:{seeker_archetype}-{partner}");
    }
}

/// Split a hue window `center ± padding` into linear sub-ranges,
/// honoring the index contract that wrap-around windows are the
/// caller's job to split.
fn split_hue_window(center: f32, padding: f32) -> Vec<(f32, f32)> {
    if padding >= 180.0 {
        return vec![(0.0, HUE_MODULUS)];
    }
    let lo = center - padding;
    let hi = center + padding;
    if lo < 0.0 {
        vec![(0.0, hi), (lo + HUE_MODULUS, HUE_MODULUS)]
    } else if hi > HUE_MODULUS {
        vec![(lo, HUE_MODULUS), (0.0, hi - HUE_MODULUS)]
    } else {
        vec![(lo, hi)]
    }
}

fn clamp_window(preference: Option<(f32, f32)>) -> (f32, f32) {
    match preference {
        Some((lo, hi)) => (lo.max(0.0), hi.min(255.0)),
        None => (0.0, 255.0),
    }
}
