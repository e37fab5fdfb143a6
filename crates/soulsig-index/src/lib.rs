//! Spatial index for candidate personality points.
//!
//! # Architecture
//!
//! A KD-style tree over `(hue, manifested, soul)`, splitting on
//! `depth % 3`. The hue axis is circular but the tree is built for
//! linear axes, which imposes two documented contracts:
//!
//! - [`SpatialIndex::range_query`] treats the hue range as **linear**; a
//!   query that wraps past 0°/360° must be split by the caller into two
//!   sub-queries and unioned.
//! - [`SpatialIndex::radius_query`] uses the circular distance for the
//!   inclusion test but the linear axis difference for the pruning
//!   bound, with a wrap guard near 0°/360° - conservative (may visit
//!   extra nodes), never misses a valid match.
//!
//! There is no `delete`: removal is a tombstone bit the queries skip,
//! reclaimed by a periodic [`SpatialIndex::rebuild`] (arena of entries
//! plus an index-of-indices tree, so no pointer rebalancing).
//!
//! # Error Handling
//!
//! Operations fail fast: non-finite coordinates and inverted ranges
//! error immediately. No fallbacks or silent clamping.

mod error;
mod status;
mod tree;

pub use error::{IndexError, IndexResult};
pub use status::IndexStatus;
pub use tree::{CandidateEntry, SpatialIndex};
