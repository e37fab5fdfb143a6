//! Bounded compatibility cache.
//!
//! The dimensional core of a match is a pure function of the two
//! signatures plus the scoring configuration, so it is cached under the
//! `(seeker_signature, candidate_signature, config_version)` key with a
//! bounded capacity and LRU-style eviction (moka), replacing the
//! unbounded global maps of earlier designs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::sync::Cache;

use soulsig_core::types::Signature;

use crate::result::{MatchDistances, PerAxisAlignment};

/// Cache key: both signatures plus the scoring-config version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub seeker: Signature,
    pub candidate: Signature,
    pub version: u64,
}

/// Cached pure scoring core: distances plus the dimensional score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoredPair {
    pub distances: MatchDistances,
    pub per_axis: PerAxisAlignment,
    pub dimensional: f32,
}

/// Cache hit/miss statistics.
///
/// Thread-safe counters using atomic operations.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
}

impl CacheStats {
    /// Record a cache hit.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an insertion.
    #[inline]
    pub fn record_insertion(&self) {
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    /// Total hits.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Total misses.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Total insertions.
    #[inline]
    pub fn insertions(&self) -> u64 {
        self.insertions.load(Ordering::Relaxed)
    }

    /// Hit ratio in `[0, 1]`; 0 before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Bounded cache over scored signature pairs.
pub struct CompatibilityCache {
    inner: Cache<CacheKey, ScoredPair>,
    stats: Arc<CacheStats>,
}

impl CompatibilityCache {
    /// Create a cache with the given entry capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Fetch a cached pair, recording hit/miss.
    pub(crate) fn get(&self, key: &CacheKey) -> Option<ScoredPair> {
        match self.inner.get(key) {
            Some(pair) => {
                self.stats.record_hit();
                Some(pair)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Insert a scored pair.
    pub(crate) fn insert(&self, key: CacheKey, pair: ScoredPair) {
        self.inner.insert(key, pair);
        self.stats.record_insertion();
    }

    /// Shared statistics handle.
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Approximate entry count (moka updates lazily).
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl std::fmt::Debug for CompatibilityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompatibilityCache")
            .field("entries", &self.inner.entry_count())
            .field("hits", &self.stats.hits())
            .field("misses", &self.stats.misses())
            .finish()
    }
}
