//! The KD-style tree over candidate personality points.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use soulsig_core::distance::{weighted_distance, AxisWeights, DistanceMetric};
use soulsig_core::types::{PersonalityPoint, Signature, SubjectId, HUE_MODULUS};

use crate::error::{IndexError, IndexResult};
use crate::status::IndexStatus;

/// One candidate in the index.
///
/// Owned by the index once inserted and never mutated in place: the tree
/// does not support relocation, so an update is insert-of-new plus
/// tombstoning of the stale entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    /// Candidate identifier.
    pub id: SubjectId,
    /// Position in personality space.
    pub point: PersonalityPoint,
    /// Compact signature of `point`.
    pub signature: Signature,
    /// Free-form tags the caller filters on.
    pub tags: Vec<String>,
    tombstoned: bool,
}

impl CandidateEntry {
    /// Create a live entry.
    pub fn new(id: SubjectId, point: PersonalityPoint, signature: Signature) -> Self {
        Self {
            id,
            point,
            signature,
            tags: Vec::new(),
            tombstoned: false,
        }
    }

    /// Attach tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// True when the entry has been marked stale.
    #[inline]
    pub fn is_tombstoned(&self) -> bool {
        self.tombstoned
    }
}

/// Tree node: an arena index plus child links.
#[derive(Debug, Clone, Copy)]
struct Node {
    entry: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// A 3-way KD index over `(hue, manifested, soul)`.
///
/// Balanced by construction via [`SpatialIndex::from_entries`];
/// incremental [`SpatialIndex::insert`] is O(log n) average but never
/// rebalances, so a deeply skewed insert order degrades toward O(n) -
/// callers with bulk data should prefer the bulk constructor or call
/// [`SpatialIndex::rebuild`] periodically.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    entries: Vec<CandidateEntry>,
    nodes: Vec<Node>,
    root: Option<usize>,
    live: usize,
    by_id: HashMap<SubjectId, usize>,
}

impl SpatialIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a balanced index from a batch of entries (median split).
    pub fn from_entries(entries: Vec<CandidateEntry>) -> Self {
        let mut index = Self::new();
        for entry in entries {
            index.push_entry(entry);
        }
        index.rebuild();
        index
    }

    /// Insert one entry.
    ///
    /// A live entry with the same id is tombstoned first (update =
    /// insert-of-new / mark-stale).
    pub fn insert(&mut self, entry: CandidateEntry) {
        if let Some(&stale) = self.by_id.get(&entry.id) {
            if !self.entries[stale].tombstoned {
                self.entries[stale].tombstoned = true;
                self.live -= 1;
                debug!(id = %entry.id, "tombstoned stale entry on re-insert");
            }
        }

        let entry_index = self.push_entry(entry);
        let node_index = self.nodes.len();
        self.nodes.push(Node {
            entry: entry_index,
            left: None,
            right: None,
        });

        match self.root {
            None => self.root = Some(node_index),
            Some(root) => {
                let mut current = root;
                let mut depth = 0usize;
                loop {
                    let axis = depth % 3;
                    let split = self.entries[self.nodes[current].entry].point.axis(axis);
                    let coord = self.entries[entry_index].point.axis(axis);
                    let link = if coord < split {
                        &mut self.nodes[current].left
                    } else {
                        &mut self.nodes[current].right
                    };
                    match link {
                        Some(child) => {
                            current = *child;
                            depth += 1;
                        }
                        None => {
                            *link = Some(node_index);
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Number of live (queryable) entries.
    #[inline]
    pub fn size(&self) -> usize {
        self.live
    }

    /// Total arena length, tombstones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no live entry exists.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Mark an entry stale; returns false for unknown or already
    /// tombstoned ids.
    pub fn tombstone(&mut self, id: SubjectId) -> bool {
        match self.by_id.get(&id) {
            Some(&entry_index) if !self.entries[entry_index].tombstoned => {
                self.entries[entry_index].tombstoned = true;
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    /// Drop tombstones and rebuild a balanced tree (median split per
    /// `depth % 3` axis).
    pub fn rebuild(&mut self) {
        let old_total = self.entries.len();
        let survivors: Vec<CandidateEntry> = std::mem::take(&mut self.entries)
            .into_iter()
            .filter(|e| !e.tombstoned)
            .collect();

        self.nodes.clear();
        self.by_id.clear();
        self.root = None;
        self.live = 0;
        for entry in survivors {
            self.push_entry(entry);
        }

        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        self.root = self.build_balanced(&mut order, 0);

        debug!(
            reclaimed = old_total - self.entries.len(),
            live = self.live,
            "index rebuilt"
        );
    }

    /// Current health snapshot.
    pub fn status(&self) -> IndexStatus {
        IndexStatus {
            total: self.entries.len(),
            live: self.live,
            tombstoned: self.entries.len() - self.live,
            depth: self.depth_of(self.root),
        }
    }

    /// Axis-aligned box query.
    ///
    /// Ranges are inclusive `[lo, hi]`. The hue range is **linear**: a
    /// range wrapping past 0°/360° must be split by the caller into two
    /// sub-queries. Tombstoned entries are skipped.
    ///
    /// # Errors
    ///
    /// [`IndexError::InvalidRange`] on inverted or non-finite bounds.
    pub fn range_query(
        &self,
        hue: (f32, f32),
        manifested: (f32, f32),
        soul: (f32, f32),
    ) -> IndexResult<Vec<&CandidateEntry>> {
        let ranges = [
            validate_range("hue", hue)?,
            validate_range("manifested", manifested)?,
            validate_range("soul", soul)?,
        ];
        let mut results = Vec::new();
        self.range_walk(self.root, 0, &ranges, &mut results);
        Ok(results)
    }

    /// All entries within `radius` of `center` under the weighted
    /// Euclidean distance.
    ///
    /// Inclusion uses the true (circular-hue) weighted distance. The
    /// per-axis pruning bound is the linear difference - a conservative
    /// lower bound, loose on the hue axis, so extra nodes may be
    /// visited but no valid match is ever missed; near 0°/360° both
    /// subtrees are searched outright.
    ///
    /// # Errors
    ///
    /// [`IndexError::NonFinite`] on a non-finite or negative radius.
    pub fn radius_query(
        &self,
        center: &PersonalityPoint,
        radius: f32,
        weights: &AxisWeights,
    ) -> IndexResult<Vec<&CandidateEntry>> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(IndexError::NonFinite {
                what: "radius",
                value: radius,
            });
        }
        let mut results = Vec::new();
        self.radius_walk(self.root, 0, center, radius, weights, &mut results);
        Ok(results)
    }

    /// Iterate live entries in arena order.
    pub fn live_entries(&self) -> impl Iterator<Item = &CandidateEntry> {
        self.entries.iter().filter(|e| !e.tombstoned)
    }

    /// Look up a live entry by id.
    pub fn get(&self, id: SubjectId) -> Option<&CandidateEntry> {
        self.by_id
            .get(&id)
            .map(|&i| &self.entries[i])
            .filter(|e| !e.tombstoned)
    }

    fn push_entry(&mut self, entry: CandidateEntry) -> usize {
        let index = self.entries.len();
        if !entry.tombstoned {
            self.live += 1;
        }
        self.by_id.insert(entry.id, index);
        self.entries.push(entry);
        index
    }

    fn build_balanced(&mut self, order: &mut [usize], depth: usize) -> Option<usize> {
        if order.is_empty() {
            return None;
        }
        let axis = depth % 3;
        order.sort_by(|&a, &b| {
            self.entries[a]
                .point
                .axis(axis)
                .partial_cmp(&self.entries[b].point.axis(axis))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let median = order.len() / 2;
        let entry = order[median];

        let (left_slice, rest) = order.split_at_mut(median);
        let right_slice = &mut rest[1..];
        // Recursion splits disjoint slices; clone them to appease the
        // borrow of self during the nested calls.
        let mut left_order = left_slice.to_vec();
        let mut right_order = right_slice.to_vec();

        let left = self.build_balanced(&mut left_order, depth + 1);
        let right = self.build_balanced(&mut right_order, depth + 1);

        let node_index = self.nodes.len();
        self.nodes.push(Node { entry, left, right });
        Some(node_index)
    }

    fn depth_of(&self, node: Option<usize>) -> usize {
        match node {
            None => 0,
            Some(n) => {
                1 + self
                    .depth_of(self.nodes[n].left)
                    .max(self.depth_of(self.nodes[n].right))
            }
        }
    }

    fn range_walk<'a>(
        &'a self,
        node: Option<usize>,
        depth: usize,
        ranges: &[(f32, f32); 3],
        results: &mut Vec<&'a CandidateEntry>,
    ) {
        let Some(node_index) = node else {
            return;
        };
        let node_ref = self.nodes[node_index];
        let entry = &self.entries[node_ref.entry];
        let axis = depth % 3;
        let split = entry.point.axis(axis);
        let (lo, hi) = ranges[axis];

        if !entry.tombstoned
            && (0..3).all(|a| {
                let coord = entry.point.axis(a);
                coord >= ranges[a].0 && coord <= ranges[a].1
            })
        {
            results.push(entry);
        }

        // Left subtree holds coords < split, right holds >= split; the
        // overlap checks are inclusive to stay correct for duplicates.
        if lo <= split {
            self.range_walk(node_ref.left, depth + 1, ranges, results);
        }
        if hi >= split {
            self.range_walk(node_ref.right, depth + 1, ranges, results);
        }
    }

    fn radius_walk<'a>(
        &'a self,
        node: Option<usize>,
        depth: usize,
        center: &PersonalityPoint,
        radius: f32,
        weights: &AxisWeights,
        results: &mut Vec<&'a CandidateEntry>,
    ) {
        let Some(node_index) = node else {
            return;
        };
        let node_ref = self.nodes[node_index];
        let entry = &self.entries[node_ref.entry];
        let axis = depth % 3;
        let split = entry.point.axis(axis);
        let center_coord = center.axis(axis);
        let axis_weight = match axis {
            0 => weights.hue,
            1 => weights.manifested,
            _ => weights.soul,
        };

        if !entry.tombstoned {
            let distance =
                weighted_distance(center, &entry.point, weights, DistanceMetric::Euclidean);
            if distance <= radius {
                results.push(entry);
            }
        }

        let gap = (center_coord - split).abs() * axis_weight;
        let (near, far) = if center_coord < split {
            (node_ref.left, node_ref.right)
        } else {
            (node_ref.right, node_ref.left)
        };

        self.radius_walk(near, depth + 1, center, radius, weights, results);

        let hue_wraps = axis == 0 && {
            let reach = if axis_weight > 0.0 {
                radius / axis_weight
            } else {
                0.0
            };
            center.hue - reach < 0.0 || center.hue + reach >= HUE_MODULUS
        };
        if gap <= radius || hue_wraps {
            self.radius_walk(far, depth + 1, center, radius, weights, results);
        }
    }
}

fn validate_range(axis: &'static str, range: (f32, f32)) -> IndexResult<(f32, f32)> {
    let (lo, hi) = range;
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(IndexError::InvalidRange { axis, lo, hi });
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soulsig_core::codec;
    use uuid::Uuid;

    fn entry(hue: f32, manifested: f32, soul: f32) -> CandidateEntry {
        let point = PersonalityPoint::new(hue, manifested, soul);
        CandidateEntry::new(Uuid::new_v4(), point, codec::encode(&point))
    }

    fn full_domain(index: &SpatialIndex) -> Vec<&CandidateEntry> {
        index
            .range_query((0.0, 360.0), (0.0, 255.0), (0.0, 255.0))
            .unwrap()
    }

    #[test]
    fn size_tracks_successful_inserts() {
        let mut index = SpatialIndex::new();
        assert_eq!(index.size(), 0);
        for i in 0..37 {
            index.insert(entry(i as f32 * 9.5, (i * 7 % 256) as f32, (i * 13 % 256) as f32));
            assert_eq!(index.size(), i + 1);
        }
    }

    #[test]
    fn full_domain_range_query_returns_every_entry_exactly_once() {
        let mut index = SpatialIndex::new();
        let mut ids = Vec::new();
        for i in 0..100 {
            let e = entry(
                (i as f32 * 37.3) % 360.0,
                (i as f32 * 11.1) % 256.0,
                (i as f32 * 5.7) % 256.0,
            );
            ids.push(e.id);
            index.insert(e);
        }
        let hits = full_domain(&index);
        assert_eq!(hits.len(), 100);
        let unique: std::collections::HashSet<_> = hits.iter().map(|e| e.id).collect();
        assert_eq!(unique.len(), 100);
        for id in ids {
            assert!(unique.contains(&id), "entry {id} missing from full scan");
        }
    }

    #[test]
    fn range_query_filters_per_axis() {
        let mut index = SpatialIndex::new();
        index.insert(entry(10.0, 100.0, 100.0));
        index.insert(entry(50.0, 100.0, 100.0));
        index.insert(entry(10.0, 200.0, 100.0));
        index.insert(entry(10.0, 100.0, 240.0));

        let hits = index
            .range_query((0.0, 30.0), (50.0, 150.0), (50.0, 150.0))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].point.hue, 10.0);
        assert_eq!(hits[0].point.manifested, 100.0);
    }

    #[test]
    fn range_query_hue_is_linear_not_circular() {
        let mut index = SpatialIndex::new();
        index.insert(entry(355.0, 100.0, 100.0));
        index.insert(entry(5.0, 100.0, 100.0));

        // A wrap-around window must be issued as two linear sub-queries.
        let low = index
            .range_query((0.0, 10.0), (0.0, 255.0), (0.0, 255.0))
            .unwrap();
        let high = index
            .range_query((350.0, 360.0), (0.0, 255.0), (0.0, 255.0))
            .unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(high.len(), 1);
    }

    #[test]
    fn range_query_rejects_inverted_bounds() {
        let index = SpatialIndex::new();
        let err = index
            .range_query((30.0, 10.0), (0.0, 255.0), (0.0, 255.0))
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidRange { axis: "hue", .. }));
        assert!(index
            .range_query((0.0, 10.0), (f32::NAN, 255.0), (0.0, 255.0))
            .is_err());
    }

    #[test]
    fn radius_query_matches_brute_force() {
        let mut index = SpatialIndex::new();
        let mut points = Vec::new();
        for i in 0..200 {
            let p = PersonalityPoint::new(
                (i as f32 * 17.9) % 360.0,
                (i as f32 * 7.3) % 256.0,
                (i as f32 * 3.1) % 256.0,
            );
            points.push(p);
            index.insert(CandidateEntry::new(Uuid::new_v4(), p, codec::encode(&p)));
        }

        let weights = AxisWeights::default();
        let center = PersonalityPoint::new(10.0, 128.0, 128.0);
        for radius in [0.0, 60.0, 150.0, 400.0] {
            let hits = index.radius_query(&center, radius, &weights).unwrap();
            let expected = points
                .iter()
                .filter(|p| {
                    weighted_distance(&center, p, &weights, DistanceMetric::Euclidean) <= radius
                })
                .count();
            assert_eq!(
                hits.len(),
                expected,
                "radius {radius}: tree={} brute={expected}",
                hits.len()
            );
        }
    }

    #[test]
    fn radius_query_matches_brute_force_on_random_pools() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(0x5EED);

        let mut index = SpatialIndex::new();
        let mut points = Vec::new();
        for _ in 0..300 {
            let p = PersonalityPoint::new(
                rng.gen_range(0.0..360.0),
                rng.gen_range(0.0..=255.0),
                rng.gen_range(0.0..=255.0),
            );
            points.push(p);
            index.insert(CandidateEntry::new(Uuid::new_v4(), p, codec::encode(&p)));
        }

        let weights = AxisWeights::default();
        for _ in 0..25 {
            let center = PersonalityPoint::new(
                rng.gen_range(0.0..360.0),
                rng.gen_range(0.0..=255.0),
                rng.gen_range(0.0..=255.0),
            );
            let radius = rng.gen_range(0.0..500.0);
            let hits = index.radius_query(&center, radius, &weights).unwrap();
            let brute = points
                .iter()
                .filter(|p| {
                    weighted_distance(&center, p, &weights, DistanceMetric::Euclidean) <= radius
                })
                .count();
            assert_eq!(
                hits.len(),
                brute,
                "mismatch at center {center:?} radius {radius}"
            );
        }
    }

    #[test]
    fn radius_query_finds_wrap_around_neighbors() {
        let mut index = SpatialIndex::new();
        // Entries intentionally inserted so that the wrap pair straddles
        // the hue split plane.
        index.insert(entry(180.0, 128.0, 128.0));
        index.insert(entry(350.0, 128.0, 128.0));
        index.insert(entry(90.0, 128.0, 128.0));

        let center = PersonalityPoint::new(5.0, 128.0, 128.0);
        let hits = index
            .radius_query(&center, 40.0, &AxisWeights::default())
            .unwrap();
        assert_eq!(hits.len(), 1, "expected only the 350° neighbor");
        assert_eq!(hits[0].point.hue, 350.0);
    }

    #[test]
    fn tombstoned_entries_are_invisible_until_rebuild_reclaims_them() {
        let mut index = SpatialIndex::new();
        let victim = entry(10.0, 10.0, 10.0);
        let victim_id = victim.id;
        index.insert(victim);
        index.insert(entry(200.0, 200.0, 200.0));

        assert!(index.tombstone(victim_id));
        assert!(!index.tombstone(victim_id), "double tombstone must be a no-op");
        assert_eq!(index.size(), 1);
        assert_eq!(index.len(), 2);
        assert!(full_domain(&index).iter().all(|e| e.id != victim_id));

        index.rebuild();
        assert_eq!(index.len(), 1);
        assert_eq!(index.size(), 1);
        assert_eq!(index.status().tombstoned, 0);
    }

    #[test]
    fn reinsert_same_id_tombstones_the_stale_entry() {
        let mut index = SpatialIndex::new();
        let id = Uuid::new_v4();
        let p1 = PersonalityPoint::new(10.0, 10.0, 10.0);
        let p2 = PersonalityPoint::new(300.0, 200.0, 200.0);
        index.insert(CandidateEntry::new(id, p1, codec::encode(&p1)));
        index.insert(CandidateEntry::new(id, p2, codec::encode(&p2)));

        assert_eq!(index.size(), 1);
        let hits = full_domain(&index);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].point.hue, 300.0);
    }

    #[test]
    fn bulk_build_is_balanced() {
        let entries: Vec<CandidateEntry> = (0..1023)
            .map(|i| {
                entry(
                    (i as f32 * 0.352) % 360.0,
                    (i as f32 * 0.9) % 256.0,
                    (i as f32 * 1.7) % 256.0,
                )
            })
            .collect();
        let index = SpatialIndex::from_entries(entries);
        assert_eq!(index.size(), 1023);
        // A perfectly balanced tree of 1023 nodes has depth 10; allow a
        // little slack for duplicate coordinates at the medians.
        assert!(
            index.status().depth <= 12,
            "depth {} too deep for bulk build",
            index.status().depth
        );
    }

    #[test]
    fn skewed_incremental_insert_degrades_but_stays_correct() {
        let mut index = SpatialIndex::new();
        for i in 0..64 {
            index.insert(entry(i as f32 * 5.0, i as f32, i as f32));
        }
        let skewed_depth = index.status().depth;
        assert_eq!(full_domain(&index).len(), 64);

        index.rebuild();
        assert!(index.status().depth < skewed_depth);
        assert_eq!(full_domain(&index).len(), 64);
    }
}
