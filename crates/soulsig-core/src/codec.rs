//! Signature codec: conversions between a [`PersonalityPoint`] and its
//! compact hex [`Signature`], plus nearest-archetype classification.
//!
//! # Quantization
//!
//! Each dimension is stored as one byte. Hue is rescaled from `[0, 360)`
//! before quantization (`round(hue / 360 * 255)`), the linear axes are
//! rounded directly. The codec is deterministic and lossy:
//! `decode(encode(p))` differs from `p` by at most one quantization step
//! per axis (hue step 360/255 ≈ 1.41°, linear step 1).

use crate::distance::circular_distance;
use crate::error::CoreResult;
use crate::types::{
    Archetype, ArchetypeMatch, PersonalityPoint, Signature, HUE_MODULUS, LINEAR_MAX,
};

/// Encode a point as its 6-hex-digit signature.
///
/// Pure and infallible: the point type's invariants guarantee every
/// coordinate is already in its quantizable range.
pub fn encode(point: &PersonalityPoint) -> Signature {
    let hue_byte = (point.hue / HUE_MODULUS * LINEAR_MAX).round() as u8;
    let manifested_byte = point.manifested.clamp(0.0, LINEAR_MAX).round() as u8;
    let soul_byte = point.soul.clamp(0.0, LINEAR_MAX).round() as u8;
    Signature::from_bytes([hue_byte, manifested_byte, soul_byte])
}

/// Decode a signature string back into a point.
///
/// Accepts an optional leading `#`.
///
/// # Errors
///
/// Returns [`crate::CoreError::ValidationError`] when the input is not
/// exactly 6 hex digits after stripping the prefix.
pub fn decode(input: &str) -> CoreResult<PersonalityPoint> {
    let signature = Signature::parse(input)?;
    Ok(decode_signature(&signature))
}

/// Decode an already-parsed signature (infallible inverse scaling).
pub fn decode_signature(signature: &Signature) -> PersonalityPoint {
    let [hue_byte, manifested_byte, soul_byte] = signature.bytes();
    PersonalityPoint::new(
        hue_byte as f32 / LINEAR_MAX * HUE_MODULUS,
        manifested_byte as f32,
        soul_byte as f32,
    )
}

/// Nearest of the 8 archetype anchors by circular distance.
///
/// Equidistant hues resolve to the anchor declared first (declaration
/// order = anchor-angle order).
pub fn archetype_of(hue: f32) -> ArchetypeMatch {
    let mut best = Archetype::Visionary;
    let mut best_distance = f32::MAX;
    for archetype in Archetype::all() {
        let distance = circular_distance(hue, archetype.anchor_degrees(), HUE_MODULUS);
        if distance < best_distance {
            best = archetype;
            best_distance = distance;
        }
    }
    ArchetypeMatch {
        archetype: best,
        anchor_degrees: best.anchor_degrees(),
        distance: best_distance,
    }
}
