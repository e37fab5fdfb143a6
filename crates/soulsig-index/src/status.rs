//! Index health reporting.

use serde::{Deserialize, Serialize};

/// Snapshot of index occupancy and shape.
///
/// `tombstoned / total` is the signal a caller watches to schedule a
/// [`crate::SpatialIndex::rebuild`]; `depth` grows past `log2(total)`
/// under skewed insert order (the tree never rebalances incrementally).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatus {
    /// Total entries in the arena, including tombstoned ones.
    pub total: usize,
    /// Entries visible to queries.
    pub live: usize,
    /// Entries awaiting reclamation by a rebuild.
    pub tombstoned: usize,
    /// Current maximum tree depth (0 for an empty tree).
    pub depth: usize,
}

impl IndexStatus {
    /// Tombstone fraction, `[0, 1]`; 0 for an empty index.
    pub fn tombstone_ratio(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.tombstoned as f32 / self.total as f32
        }
    }
}
