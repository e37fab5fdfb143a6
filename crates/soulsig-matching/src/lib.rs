//! Compatibility matching pipeline.
//!
//! # Architecture
//!
//! A state-machine-free, five-stage batch pipeline per query:
//!
//! | Stage | Purpose |
//! |-------|---------|
//! | 1 | Dimensional filter: box query against the spatial index |
//! | 2 | Veto filter: hard boolean constraints, membership only |
//! | 3 | Score & rank: cached weighted-distance scoring + blend |
//! | 4 | Harmony-zone filter: score-banded buckets |
//! | 5 | Complementary boost: opposite-archetype pairs |
//!
//! The pipeline performs no blocking I/O; the only shared state is the
//! read-mostly spatial index (behind an `RwLock`) and the bounded
//! compatibility cache. "No matches" is a valid empty result;
//! "matching unavailable" propagates as a `ConfigurationError`.

mod cache;
mod options;
mod pipeline;
mod provider;
mod result;
mod service;

pub use cache::{CacheStats, CompatibilityCache};
pub use options::{HarmonyZone, MatchingOptions};
pub use pipeline::{MatchingPipeline, SeekerView};
pub use provider::{ParameterProvider, StaticParameterProvider};
pub use result::{
    CompatibilityMatch, MatchBreakdown, MatchDistances, MatchMetrics, MatchType, MatchingResult,
    PerAxisAlignment,
};
pub use service::MatchingService;
