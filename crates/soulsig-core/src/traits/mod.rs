//! Capability traits consumed by the engine.
//!
//! The core treats text analysis and persistence as external, opaque
//! capabilities: this module defines only the contracts the inference
//! engine needs from them, never how they are computed. Stub
//! implementations suitable for development and tests live in
//! [`crate::stubs`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::{ParameterId, SubjectId, SubjectProfile};

/// Sentiment summary for one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Polarity, `[-1, 1]`.
    pub polarity: f32,
    /// Subjectivity, `[0, 1]`.
    pub subjectivity: f32,
    /// Analyzer's trust in its own reading, `[0, 1]`.
    pub confidence: f32,
}

/// Surface linguistic features of one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinguisticFeatures {
    /// Lexical/syntactic complexity, `[0, 1]`.
    pub complexity: f32,
    /// Register formality, `[0, 1]`.
    pub formality: f32,
    /// Emotional charge, `[0, 1]`.
    pub emotionality: f32,
}

/// Signal set extracted from one message by the external analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSignals {
    /// Sentiment summary.
    pub sentiment: Sentiment,
    /// Salient keywords found in the message.
    pub keywords: Vec<String>,
    /// Emotional marker tokens found in the message.
    pub emotional_markers: Vec<String>,
    /// Influence strength per touched parameter, each in `[0, 1]`.
    pub personality_indicators: BTreeMap<ParameterId, f32>,
    /// Surface linguistic features.
    pub linguistic_features: LinguisticFeatures,
}

impl TextSignals {
    /// The zero signal: what a timed-out or failed analyzer call
    /// degrades to.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the signal set carries no parameter influence.
    pub fn is_empty(&self) -> bool {
        self.personality_indicators.is_empty()
    }

    /// Reject malformed analyzer output (fail fast at the boundary).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InferenceFailed`] on non-finite or
    /// out-of-range strengths.
    pub fn validate(&self) -> CoreResult<()> {
        for (parameter, strength) in &self.personality_indicators {
            if !strength.is_finite() || !(0.0..=1.0).contains(strength) {
                return Err(CoreError::InferenceFailed(format!(
                    "indicator strength for {parameter} out of range: {strength}"
                )));
            }
        }
        if !self.sentiment.polarity.is_finite() || !(-1.0..=1.0).contains(&self.sentiment.polarity)
        {
            return Err(CoreError::InferenceFailed(format!(
                "sentiment polarity out of range: {}",
                self.sentiment.polarity
            )));
        }
        Ok(())
    }
}

/// Opaque text-analysis capability.
///
/// The engine only depends on this contract; whether signals come from a
/// language model, a lexicon, or anything else is a collaborator's
/// concern. Implementations must be side-effect free per call.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Extract a signal set from one message.
    async fn analyze(&self, text: &str) -> CoreResult<TextSignals>;
}

/// Opaque persistence capability for subject profiles.
///
/// Both operations are atomic, all-or-nothing from the engine's point of
/// view: a failed `save` must leave the previously stored profile intact.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a profile; `None` when the subject has never been saved.
    async fn load(&self, subject_id: SubjectId) -> CoreResult<Option<SubjectProfile>>;

    /// Persist a profile, replacing any previous version.
    async fn save(&self, subject_id: SubjectId, profile: &SubjectProfile) -> CoreResult<()>;
}
