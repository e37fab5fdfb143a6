//! Lexicon-driven stub analyzer.
//!
//! Deterministic replacement for the external text analyzer: matches a
//! fixed keyword lexicon against the lowercased message and emits
//! parameter indicators with fixed strengths. Tie-break values (such as
//! subjectivity) are derived from input hashing so repeated calls agree
//! exactly. This is development/test scaffolding, not an NLP claim.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::error::CoreResult;
use crate::traits::{LinguisticFeatures, Sentiment, TextAnalyzer, TextSignals};
use crate::types::ParameterId;

/// `(keyword, parameter, strength)` lexicon rows.
///
/// Keywords are matched as lowercase substrings; the strongest strength
/// wins when several rows touch the same parameter.
const LEXICON: &[(&str, ParameterId, f32)] = &[
    // Visionary
    ("imagine", ParameterId::Imagination, 0.8),
    ("dream", ParameterId::Imagination, 0.6),
    ("future", ParameterId::FutureOrientation, 0.7),
    ("someday", ParameterId::FutureOrientation, 0.6),
    // Cognitive
    ("analyze", ParameterId::AnalyticalThinking, 0.8),
    ("logic", ParameterId::AnalyticalThinking, 0.7),
    ("theory", ParameterId::AnalyticalThinking, 0.6),
    ("curious", ParameterId::Curiosity, 0.8),
    ("research", ParameterId::Curiosity, 0.7),
    ("why", ParameterId::Curiosity, 0.4),
    // Guardian
    ("loyal", ParameterId::Loyalty, 0.8),
    ("protect", ParameterId::Loyalty, 0.6),
    ("reliable", ParameterId::Dependability, 0.7),
    ("promise", ParameterId::Dependability, 0.5),
    // Harmonizer
    ("compromise", ParameterId::Diplomacy, 0.7),
    ("mediate", ParameterId::Diplomacy, 0.8),
    ("together", ParameterId::Cooperation, 0.5),
    ("team", ParameterId::Cooperation, 0.6),
    // Explorer
    ("adventure", ParameterId::Adventurousness, 0.8),
    ("travel", ParameterId::Adventurousness, 0.6),
    ("spontaneous", ParameterId::Spontaneity, 0.8),
    ("impulse", ParameterId::Spontaneity, 0.6),
    // Creator
    ("create", ParameterId::CreativeExpression, 0.7),
    ("art", ParameterId::CreativeExpression, 0.6),
    ("original", ParameterId::Originality, 0.7),
    ("invent", ParameterId::Originality, 0.7),
    // Empath
    ("compassion", ParameterId::Compassion, 0.8),
    ("care", ParameterId::Compassion, 0.5),
    ("feel", ParameterId::EmotionalAttunement, 0.5),
    ("empathy", ParameterId::EmotionalAttunement, 0.8),
    // Catalyst
    ("ambitious", ParameterId::Drive, 0.7),
    ("achieve", ParameterId::Drive, 0.6),
    ("lead", ParameterId::Influence, 0.6),
    ("inspire", ParameterId::Influence, 0.7),
    // Manifested
    ("confident", ParameterId::Confidence, 0.7),
    ("party", ParameterId::Sociability, 0.6),
    ("friends", ParameterId::Sociability, 0.5),
    ("speak up", ParameterId::Assertiveness, 0.7),
    ("organize", ParameterId::Discipline, 0.6),
    ("joke", ParameterId::Humor, 0.6),
    ("optimistic", ParameterId::Optimism, 0.7),
    ("alone time", ParameterId::Independence, 0.5),
    // Soul
    ("meaning", ParameterId::MeaningSeeking, 0.7),
    ("purpose", ParameterId::MeaningSeeking, 0.7),
    ("reflect", ParameterId::Introspection, 0.7),
    ("journal", ParameterId::Introspection, 0.6),
    ("authentic", ParameterId::Authenticity, 0.7),
    ("vulnerable", ParameterId::Vulnerability, 0.7),
    ("grateful", ParameterId::Gratitude, 0.7),
    ("forgive", ParameterId::Forgiveness, 0.7),
    ("spiritual", ParameterId::SpiritualOpenness, 0.7),
    ("wonder", ParameterId::Wonder, 0.6),
    ("mortality", ParameterId::MortalityAwareness, 0.7),
    ("solitude", ParameterId::ComfortWithSolitude, 0.7),
];

const POSITIVE_MARKERS: &[&str] = &["love", "happy", "excited", "wonderful", "grateful", "joy"];
const NEGATIVE_MARKERS: &[&str] = &["hate", "sad", "angry", "afraid", "terrible", "lonely"];

/// Deterministic lexicon analyzer.
#[derive(Debug, Clone, Default)]
pub struct KeywordTextAnalyzer;

impl KeywordTextAnalyzer {
    /// Create a new stub analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Generate a deterministic value in `[0, 1]` from input.
    fn hash_to_float(input: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        input.hash(&mut hasher);
        seed.hash(&mut hasher);
        let hash = hasher.finish();
        (hash as f64 / u64::MAX as f64) as f32
    }
}

#[async_trait]
impl TextAnalyzer for KeywordTextAnalyzer {
    async fn analyze(&self, text: &str) -> CoreResult<TextSignals> {
        let lowered = text.to_lowercase();

        let mut indicators: BTreeMap<ParameterId, f32> = BTreeMap::new();
        let mut keywords = Vec::new();
        for (keyword, parameter, strength) in LEXICON {
            if lowered.contains(keyword) {
                keywords.push((*keyword).to_string());
                let entry = indicators.entry(*parameter).or_insert(0.0);
                *entry = entry.max(*strength);
            }
        }

        let mut emotional_markers = Vec::new();
        let mut positive = 0usize;
        let mut negative = 0usize;
        for marker in POSITIVE_MARKERS {
            if lowered.contains(marker) {
                emotional_markers.push((*marker).to_string());
                positive += 1;
            }
        }
        for marker in NEGATIVE_MARKERS {
            if lowered.contains(marker) {
                emotional_markers.push((*marker).to_string());
                negative += 1;
            }
        }

        let marker_total = positive + negative;
        let polarity = if marker_total == 0 {
            0.0
        } else {
            (positive as f32 - negative as f32) / marker_total as f32
        };

        let word_count = lowered.split_whitespace().count().max(1);
        let signals = TextSignals {
            sentiment: Sentiment {
                polarity,
                subjectivity: Self::hash_to_float(text, 1),
                confidence: if indicators.is_empty() { 0.3 } else { 0.8 },
            },
            keywords,
            emotional_markers,
            personality_indicators: indicators,
            linguistic_features: LinguisticFeatures {
                complexity: ((word_count as f32) / 40.0).min(1.0),
                formality: Self::hash_to_float(text, 2),
                emotionality: ((marker_total as f32) / 4.0).min(1.0),
            },
        };
        signals.validate()?;
        Ok(signals)
    }
}
