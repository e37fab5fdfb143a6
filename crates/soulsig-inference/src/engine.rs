//! The per-subject inference engine.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use soulsig_core::codec;
use soulsig_core::config::InferenceConfig;
use soulsig_core::error::{CoreError, CoreResult};
use soulsig_core::traits::{ProfileStore, TextAnalyzer, TextSignals};
use soulsig_core::types::{
    Dimension, InferenceEvent, InferencePhase, ParameterId, PersonalityPoint, Signature,
    SubjectId, SubjectProfile, LINEAR_MAX,
};

use crate::decay::decay_confidence;
use crate::update::{apply_signal, derive_update};

/// What one processed message did to a subject.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceOutcome {
    /// Parameters touched by this message's signals.
    pub parameters_updated: usize,
    /// Events appended to the profile log.
    pub events_appended: usize,
    /// Phase after processing.
    pub phase: InferencePhase,
    /// True when this message crossed a phase threshold.
    pub phase_advanced: bool,
    /// Point after recomputation.
    pub point: PersonalityPoint,
    /// Signature after recomputation.
    pub signature: Signature,
    /// True when the analyzer timed out or failed and the message
    /// degraded to zero signal.
    pub degraded: bool,
}

/// Inference engine over an analyzer and a profile store.
///
/// Profiles are owned exclusively by this engine: each sits behind its
/// own async mutex (single writer per subject), held in a concurrent
/// map so distinct subjects never contend.
pub struct InferenceEngine<A: TextAnalyzer, S: ProfileStore> {
    analyzer: Arc<A>,
    store: Arc<S>,
    config: InferenceConfig,
    profiles: DashMap<SubjectId, Arc<Mutex<SubjectProfile>>>,
}

impl<A: TextAnalyzer, S: ProfileStore> InferenceEngine<A, S> {
    /// Create an engine; fails fast on invalid configuration.
    pub fn new(analyzer: Arc<A>, store: Arc<S>, config: InferenceConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            analyzer,
            store,
            config,
            profiles: DashMap::new(),
        })
    }

    /// Process one message for a subject.
    ///
    /// The profile is loaded (or created) on first contact. Analyzer
    /// failures and timeouts degrade to a zero-signal message: the
    /// message still counts toward phase progression, but no parameter
    /// moves. Updates are applied only after a successful analyzer
    /// response, so a cancelled call leaves no partial state.
    #[instrument(skip(self, text), fields(subject = %subject_id))]
    pub async fn process_message(
        &self,
        subject_id: SubjectId,
        text: &str,
    ) -> CoreResult<InferenceOutcome> {
        let handle = self.profile_handle(subject_id, true).await?;

        // Analyze outside the profile lock; the analyzer is the only
        // I/O-bound suspension point on this path.
        let (signals, degraded) = self.analyze_with_fallback(text).await;

        let mut profile = handle.lock().await;
        let now = Utc::now();
        profile.message_count += 1;

        let mut events_appended = 0usize;
        let parameters_updated = signals.personality_indicators.len();
        for (&parameter, &strength) in &signals.personality_indicators {
            let update = derive_update(parameter, strength, signals.sentiment.confidence);
            let data = profile.parameter_mut(parameter, now);
            let outcome = apply_signal(data, parameter, update, text, now, &self.config);
            let phase = profile.phase;
            profile.events.push(InferenceEvent {
                timestamp: now,
                source_text: text.to_string(),
                parameter,
                contribution: outcome.contribution,
                confidence_gain: outcome.confidence_gain,
                phase,
            });
            events_appended += 1;
            if outcome.contradicted {
                debug!(%parameter, "contradiction damping applied");
            }
        }

        self.decay_idle_parameters(&mut profile, now);
        self.recompute(&mut profile);

        let previous_phase = profile.phase;
        profile.phase =
            InferencePhase::for_message_count(profile.message_count, &self.config.phase_thresholds);
        let phase_advanced = profile.phase > previous_phase;
        if phase_advanced {
            debug!(from = ?previous_phase, to = ?profile.phase, "inference phase advanced");
        }
        profile.updated_at = now;

        self.store.save(subject_id, &profile).await?;

        Ok(InferenceOutcome {
            parameters_updated,
            events_appended,
            phase: profile.phase,
            phase_advanced,
            point: profile.point,
            signature: profile.signature,
            degraded,
        })
    }

    /// The `n` lowest-confidence parameters, ascending - the next
    /// question targets. `n` defaults to the configured count.
    pub async fn next_question_targets(
        &self,
        subject_id: SubjectId,
        n: Option<usize>,
    ) -> CoreResult<Vec<(ParameterId, f32)>> {
        let handle = self.profile_handle(subject_id, false).await?;
        let profile = handle.lock().await;
        let count = n.unwrap_or(self.config.next_question_count);
        Ok(profile
            .parameters_by_confidence()
            .into_iter()
            .take(count)
            .collect())
    }

    /// Apply temporal decay outside the message flow (idle subjects),
    /// then recompute and persist. Returns the number of decayed
    /// parameters.
    pub async fn decay_sweep(&self, subject_id: SubjectId) -> CoreResult<usize> {
        let handle = self.profile_handle(subject_id, false).await?;
        let mut profile = handle.lock().await;
        let now = Utc::now();
        let decayed = self.decay_idle_parameters(&mut profile, now);
        if decayed > 0 {
            self.recompute(&mut profile);
            profile.updated_at = now;
            self.store.save(subject_id, &profile).await?;
        }
        Ok(decayed)
    }

    /// An owned snapshot of a subject's profile.
    pub async fn profile_snapshot(&self, subject_id: SubjectId) -> CoreResult<SubjectProfile> {
        let handle = self.profile_handle(subject_id, false).await?;
        let profile = handle.lock().await;
        Ok(profile.clone())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Get the subject's profile handle, loading from the store on
    /// first touch; `create_missing` controls whether an unknown
    /// subject starts a fresh profile or errors.
    async fn profile_handle(
        &self,
        subject_id: SubjectId,
        create_missing: bool,
    ) -> CoreResult<Arc<Mutex<SubjectProfile>>> {
        if let Some(handle) = self.profiles.get(&subject_id) {
            return Ok(Arc::clone(&handle));
        }

        let loaded = self.store.load(subject_id).await?;
        let profile = match loaded {
            Some(profile) => profile,
            None if create_missing => SubjectProfile::new(subject_id, Utc::now()),
            None => return Err(CoreError::ProfileNotFound { id: subject_id }),
        };

        // A concurrent first touch may have inserted already; the entry
        // API keeps exactly one handle per subject.
        let handle = self
            .profiles
            .entry(subject_id)
            .or_insert_with(|| Arc::new(Mutex::new(profile)));
        Ok(Arc::clone(&handle))
    }

    /// Call the analyzer under the configured timeout; on timeout,
    /// error, or malformed output, degrade to the zero signal.
    async fn analyze_with_fallback(&self, text: &str) -> (TextSignals, bool) {
        let timeout = Duration::from_millis(self.config.analyzer_timeout_ms);
        match tokio::time::timeout(timeout, self.analyzer.analyze(text)).await {
            Ok(Ok(signals)) => match signals.validate() {
                Ok(()) => (signals, false),
                Err(e) => {
                    warn!(error = %e, "analyzer returned malformed signals; zero signal for this message");
                    (TextSignals::empty(), true)
                }
            },
            Ok(Err(e)) => {
                warn!(error = %e, "analyzer call failed; zero signal for this message");
                (TextSignals::empty(), true)
            }
            Err(_) => {
                warn!(timeout_ms = self.config.analyzer_timeout_ms, "analyzer call timed out; zero signal for this message");
                (TextSignals::empty(), true)
            }
        }
    }

    fn decay_idle_parameters(&self, profile: &mut SubjectProfile, now: DateTime<Utc>) -> usize {
        let mut decayed = 0usize;
        for (&id, data) in profile.parameters.iter_mut() {
            if decay_confidence(data, id, now, &self.config) < 0.0 {
                decayed += 1;
            }
        }
        decayed
    }

    /// Recompute dimension confidences, the personality point, and the
    /// signature from the current parameter state.
    fn recompute(&self, profile: &mut SubjectProfile) {
        let min_confidence = self.config.min_confidence;

        // Hue: confidence-weighted circular mean over archetype-linked
        // parameters above the confidence floor.
        let mut sin_sum = 0.0_f64;
        let mut cos_sum = 0.0_f64;
        for (&id, data) in &profile.parameters {
            let Some(archetype) = id.archetype() else {
                continue;
            };
            if data.confidence < min_confidence {
                continue;
            }
            let strength = (id.weight() * data.confidence * (data.value / 100.0)) as f64;
            let radians = (archetype.anchor_degrees() as f64).to_radians();
            sin_sum += strength * radians.sin();
            cos_sum += strength * radians.cos();
        }
        let hue = if sin_sum.abs() > f64::EPSILON || cos_sum.abs() > f64::EPSILON {
            soulsig_core::types::normalize_hue(sin_sum.atan2(cos_sum).to_degrees() as f32)
        } else {
            profile.point.hue
        };

        // Manifested: weighted linear average, rescaled to [0, 255].
        let manifested = weighted_dimension_average(profile, Dimension::Manifested)
            .map(|avg| avg / 100.0 * LINEAR_MAX)
            .unwrap_or(profile.point.manifested);

        // Soul: weighted average with a square-root rescale that
        // compresses low scores and stretches high ones. The asymmetry
        // against the manifested axis is intentional.
        let soul = weighted_dimension_average(profile, Dimension::Soul)
            .map(|avg| (avg / 100.0).sqrt() * LINEAR_MAX)
            .unwrap_or(profile.point.soul);

        profile.point = PersonalityPoint::new(hue, manifested, soul);
        profile.signature = codec::encode(&profile.point);

        profile.dimension_confidence.hue = weighted_dimension_confidence(profile, Dimension::Hue);
        profile.dimension_confidence.manifested =
            weighted_dimension_confidence(profile, Dimension::Manifested);
        profile.dimension_confidence.soul = weighted_dimension_confidence(profile, Dimension::Soul);
    }
}

/// Weighted average of parameter values in a dimension; `None` when no
/// parameter of the dimension has materialized.
fn weighted_dimension_average(profile: &SubjectProfile, dimension: Dimension) -> Option<f32> {
    let mut value_sum = 0.0_f32;
    let mut weight_sum = 0.0_f32;
    for (&id, data) in &profile.parameters {
        if id.dimension() != dimension {
            continue;
        }
        let weight = id.weight() * data.confidence;
        value_sum += data.value * weight;
        weight_sum += weight;
    }
    if weight_sum > 0.0 {
        Some(value_sum / weight_sum)
    } else {
        None
    }
}

/// Weight-averaged confidence over the dimension's materialized
/// parameters; untouched catalog parameters carry no evidence and do
/// not dilute the mean.
fn weighted_dimension_confidence(profile: &SubjectProfile, dimension: Dimension) -> f32 {
    let mut confidence_sum = 0.0_f32;
    let mut weight_sum = 0.0_f32;
    for (&id, data) in &profile.parameters {
        if id.dimension() != dimension {
            continue;
        }
        confidence_sum += data.confidence * id.weight();
        weight_sum += id.weight();
    }
    if weight_sum > 0.0 {
        (confidence_sum / weight_sum).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use soulsig_core::stubs::{InMemoryProfileStore, KeywordTextAnalyzer};
    use uuid::Uuid;

    fn engine_with_stubs() -> InferenceEngine<KeywordTextAnalyzer, InMemoryProfileStore> {
        InferenceEngine::new(
            Arc::new(KeywordTextAnalyzer::new()),
            Arc::new(InMemoryProfileStore::new()),
            InferenceConfig::default(),
        )
        .unwrap()
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl TextAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _text: &str) -> CoreResult<TextSignals> {
            Err(CoreError::InferenceFailed("synthetic failure".into()))
        }
    }

    struct HangingAnalyzer;

    #[async_trait]
    impl TextAnalyzer for HangingAnalyzer {
        async fn analyze(&self, _text: &str) -> CoreResult<TextSignals> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(TextSignals::empty())
        }
    }

    #[tokio::test]
    async fn first_message_creates_a_profile_and_counts() {
        let engine = engine_with_stubs();
        let subject = Uuid::new_v4();
        let outcome = engine
            .process_message(subject, "I am curious about everything")
            .await
            .unwrap();
        assert!(!outcome.degraded);
        assert!(outcome.parameters_updated > 0);
        assert_eq!(outcome.phase, InferencePhase::Surface);

        let profile = engine.profile_snapshot(subject).await.unwrap();
        assert_eq!(profile.message_count, 1);
        assert_eq!(profile.events.len(), outcome.events_appended);
    }

    #[tokio::test]
    async fn unknown_subject_on_read_paths_is_profile_not_found() {
        let engine = engine_with_stubs();
        let err = engine
            .next_question_targets(Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ProfileNotFound { .. }));
        let err = engine.profile_snapshot(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::ProfileNotFound { .. }));
    }

    #[tokio::test]
    async fn analyzer_failure_degrades_to_zero_signal() {
        let engine = InferenceEngine::new(
            Arc::new(FailingAnalyzer),
            Arc::new(InMemoryProfileStore::new()),
            InferenceConfig::default(),
        )
        .unwrap();
        let subject = Uuid::new_v4();
        let outcome = engine.process_message(subject, "anything").await.unwrap();
        assert!(outcome.degraded);
        assert_eq!(outcome.parameters_updated, 0);

        // The message still counts toward phase progression.
        let profile = engine.profile_snapshot(subject).await.unwrap();
        assert_eq!(profile.message_count, 1);
        assert!(profile.parameters.is_empty());
    }

    #[tokio::test]
    async fn analyzer_timeout_degrades_instead_of_blocking() {
        let mut config = InferenceConfig::default();
        config.analyzer_timeout_ms = 50;
        let engine = InferenceEngine::new(
            Arc::new(HangingAnalyzer),
            Arc::new(InMemoryProfileStore::new()),
            config,
        )
        .unwrap();
        let outcome = engine
            .process_message(Uuid::new_v4(), "anything")
            .await
            .unwrap();
        assert!(outcome.degraded);
        assert_eq!(outcome.parameters_updated, 0);
    }

    #[tokio::test]
    async fn consistent_signals_move_the_point_toward_the_archetype() {
        let engine = engine_with_stubs();
        let subject = Uuid::new_v4();
        for _ in 0..10 {
            engine
                .process_message(subject, "I analyze problems with logic and research")
                .await
                .unwrap();
        }
        let profile = engine.profile_snapshot(subject).await.unwrap();
        let archetype = codec::archetype_of(profile.point.hue).archetype;
        assert_eq!(archetype.name(), "cognitive");
        assert!(profile.dimension_confidence.hue > 0.5);
    }

    #[tokio::test]
    async fn next_question_targets_are_lowest_confidence_first() {
        let engine = engine_with_stubs();
        let subject = Uuid::new_v4();
        for _ in 0..5 {
            engine
                .process_message(subject, "I analyze everything")
                .await
                .unwrap();
        }

        let targets = engine.next_question_targets(subject, Some(5)).await.unwrap();
        assert_eq!(targets.len(), 5);
        // AnalyticalThinking has plenty of evidence by now; it must not
        // be among the lowest-confidence targets.
        assert!(targets
            .iter()
            .all(|(id, _)| *id != ParameterId::AnalyticalThinking));
        for window in targets.windows(2) {
            assert!(window[0].1 <= window[1].1);
        }
    }

    #[tokio::test]
    async fn profiles_persist_through_the_store() {
        let store = Arc::new(InMemoryProfileStore::new());
        let engine = InferenceEngine::new(
            Arc::new(KeywordTextAnalyzer::new()),
            Arc::clone(&store),
            InferenceConfig::default(),
        )
        .unwrap();

        let subject = Uuid::new_v4();
        engine
            .process_message(subject, "I am curious")
            .await
            .unwrap();

        let saved = store.load(subject).await.unwrap().expect("profile saved");
        assert_eq!(saved.message_count, 1);

        // A fresh engine over the same store resumes the profile.
        let resumed = InferenceEngine::new(
            Arc::new(KeywordTextAnalyzer::new()),
            Arc::clone(&store),
            InferenceConfig::default(),
        )
        .unwrap();
        resumed
            .process_message(subject, "I am curious")
            .await
            .unwrap();
        let profile = resumed.profile_snapshot(subject).await.unwrap();
        assert_eq!(profile.message_count, 2);
    }

    #[tokio::test]
    async fn decay_sweep_reports_zero_for_fresh_profiles() {
        let engine = engine_with_stubs();
        let subject = Uuid::new_v4();
        engine
            .process_message(subject, "I am curious")
            .await
            .unwrap();
        let decayed = engine.decay_sweep(subject).await.unwrap();
        assert_eq!(decayed, 0);
    }
}
