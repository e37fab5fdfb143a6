//! Distance primitives for the 3-axis personality space.
//!
//! One circular axis (hue, degrees) and two linear axes (manifested,
//! soul). All functions are pure, symmetric in their point arguments,
//! and never produce NaN or infinity on valid input.
//!
//! # Scales
//!
//! Euclidean and Manhattan combine the raw-scale per-axis distances
//! (hue in degrees, linear axes in units), each multiplied by its axis
//! weight; with the default weights `(2, 1, 1.5)` two hue-opposite
//! points are exactly `360.0` apart. Cosine operates on the
//! `[0, 1]`-normalized weighted coordinate vectors and returns a
//! distance in `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::types::{PersonalityPoint, HUE_MODULUS, LINEAR_MAX};

/// Distance along a circular axis: `min(|a-b|, modulus - |a-b|)`.
///
/// Always in `[0, modulus/2]`. Symmetric; zero iff the angles coincide
/// modulo `modulus`.
#[inline]
pub fn circular_distance(a: f32, b: f32, modulus: f32) -> f32 {
    let diff = (a - b).abs() % modulus;
    diff.min(modulus - diff)
}

/// Metric used to combine the weighted per-axis distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Root of summed squared weighted axis distances.
    #[default]
    Euclidean,
    /// Sum of weighted axis distances.
    Manhattan,
    /// `1 - cos` over the normalized weighted coordinate vectors.
    Cosine,
}

/// Per-axis weights applied before metric combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisWeights {
    /// Weight on the circular hue axis.
    pub hue: f32,
    /// Weight on the manifested axis.
    pub manifested: f32,
    /// Weight on the soul axis.
    pub soul: f32,
}

impl Default for AxisWeights {
    fn default() -> Self {
        Self {
            hue: 2.0,
            manifested: 1.0,
            soul: 1.5,
        }
    }
}

/// Raw per-axis distances between two points (circular for hue).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDistances {
    /// Circular hue distance, `[0, 180]` degrees.
    pub hue: f32,
    /// Absolute manifested distance, `[0, 255]`.
    pub manifested: f32,
    /// Absolute soul distance, `[0, 255]`.
    pub soul: f32,
}

/// Compute the raw per-axis distances between two points.
#[inline]
pub fn axis_distances(a: &PersonalityPoint, b: &PersonalityPoint) -> AxisDistances {
    AxisDistances {
        hue: circular_distance(a.hue, b.hue, HUE_MODULUS),
        manifested: (a.manifested - b.manifested).abs(),
        soul: (a.soul - b.soul).abs(),
    }
}

/// Weighted distance between two personality points.
///
/// Per-axis distance (circular for hue, absolute for the linear axes),
/// each axis multiplied by its weight, combined by `metric`. Symmetric.
pub fn weighted_distance(
    a: &PersonalityPoint,
    b: &PersonalityPoint,
    weights: &AxisWeights,
    metric: DistanceMetric,
) -> f32 {
    let d = axis_distances(a, b);
    match metric {
        DistanceMetric::Euclidean => {
            let h = d.hue * weights.hue;
            let m = d.manifested * weights.manifested;
            let s = d.soul * weights.soul;
            (h * h + m * m + s * s).sqrt()
        }
        DistanceMetric::Manhattan => {
            d.hue * weights.hue + d.manifested * weights.manifested + d.soul * weights.soul
        }
        DistanceMetric::Cosine => cosine_point_distance(a, b, weights),
    }
}

/// Cosine distance over the normalized weighted coordinate vectors.
///
/// Coordinates are scaled to `[0, 1]` (hue by the modulus, linear axes
/// by 255) and weighted; the result is `1 - cos` clamped to `[0, 1]`.
/// Zero-magnitude vectors yield 0 when both are zero and 1 otherwise
/// (no NaN).
fn cosine_point_distance(a: &PersonalityPoint, b: &PersonalityPoint, weights: &AxisWeights) -> f32 {
    let va = [
        a.hue / HUE_MODULUS * weights.hue,
        a.manifested / LINEAR_MAX * weights.manifested,
        a.soul / LINEAR_MAX * weights.soul,
    ];
    let vb = [
        b.hue / HUE_MODULUS * weights.hue,
        b.manifested / LINEAR_MAX * weights.manifested,
        b.soul / LINEAR_MAX * weights.soul,
    ];
    let dot: f32 = va.iter().zip(&vb).map(|(x, y)| x * y).sum();
    let mag_a: f32 = va.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = vb.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 && mag_b == 0.0 {
        return 0.0;
    }
    if mag_a == 0.0 || mag_b == 0.0 {
        return 1.0;
    }
    (1.0 - dot / (mag_a * mag_b)).clamp(0.0, 1.0)
}

/// Map a distance to a compatibility score in `[0, 100]`.
///
/// `100 * (1 - distance / max_distance)`, clamped. Monotonically
/// non-increasing in distance; `max_distance <= 0` or non-finite input
/// yields 0.
#[inline]
pub fn score_from_distance(distance: f32, max_distance: f32) -> f32 {
    if !distance.is_finite() || !max_distance.is_finite() || max_distance <= 0.0 {
        return 0.0;
    }
    (100.0 * (1.0 - distance / max_distance)).clamp(0.0, 100.0)
}
