//! The 3-dimensional personality point.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Upper bound (exclusive) of the circular hue axis, in degrees.
pub const HUE_MODULUS: f32 = 360.0;

/// Upper bound (inclusive) of the linear axes.
pub const LINEAR_MAX: f32 = 255.0;

/// A point in the 3-dimensional personality space.
///
/// `hue` is circular (0 and 360 are identical); `manifested` and `soul`
/// are linear. The constructor enforces the type's invariants: hue is
/// always normalized into `[0, 360)`, the linear axes are always clamped
/// to `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalityPoint {
    /// Archetypal direction in degrees, `[0, 360)`. Circular.
    pub hue: f32,
    /// Outward expression intensity, `[0, 255]`. Linear.
    pub manifested: f32,
    /// Inner depth, `[0, 255]`. Linear.
    pub soul: f32,
}

impl PersonalityPoint {
    /// Create a point, normalizing hue into `[0, 360)` and clamping the
    /// linear axes to `[0, 255]`.
    ///
    /// Non-finite inputs are mapped to the neutral value for the axis
    /// (0 for hue, midpoint for the linear axes); use [`Self::try_new`]
    /// when non-finite input should be rejected instead.
    pub fn new(hue: f32, manifested: f32, soul: f32) -> Self {
        Self {
            hue: normalize_hue(if hue.is_finite() { hue } else { 0.0 }),
            manifested: clamp_linear(manifested),
            soul: clamp_linear(soul),
        }
    }

    /// Create a point, rejecting non-finite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValidationError`] naming the offending axis.
    pub fn try_new(hue: f32, manifested: f32, soul: f32) -> CoreResult<Self> {
        for (axis, value) in [("hue", hue), ("manifested", manifested), ("soul", soul)] {
            if !value.is_finite() {
                return Err(CoreError::ValidationError {
                    field: axis.to_string(),
                    message: format!("coordinate must be finite, got {value}"),
                });
            }
        }
        Ok(Self::new(hue, manifested, soul))
    }

    /// The neutral midpoint of the space (hue 0, linear axes at 127.5).
    pub fn neutral() -> Self {
        Self {
            hue: 0.0,
            manifested: LINEAR_MAX / 2.0,
            soul: LINEAR_MAX / 2.0,
        }
    }

    /// Coordinate on the given axis index (0 = hue, 1 = manifested, 2 = soul).
    ///
    /// # Panics
    ///
    /// Panics if `axis > 2`; axis indices come from `depth % 3` in the
    /// spatial index and are structurally bounded.
    #[inline]
    pub fn axis(&self, axis: usize) -> f32 {
        match axis {
            0 => self.hue,
            1 => self.manifested,
            2 => self.soul,
            _ => panic!("BUG: axis index {axis} out of range, expected 0..=2"),
        }
    }
}

/// Normalize a finite hue value into `[0, 360)`.
#[inline]
pub fn normalize_hue(hue: f32) -> f32 {
    let wrapped = hue.rem_euclid(HUE_MODULUS);
    // rem_euclid can return exactly 360.0 for inputs like -1e-7
    if wrapped >= HUE_MODULUS {
        0.0
    } else {
        wrapped
    }
}

#[inline]
fn clamp_linear(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, LINEAR_MAX)
    } else {
        LINEAR_MAX / 2.0
    }
}
