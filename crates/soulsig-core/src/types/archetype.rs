//! The eight archetype anchors on the circular hue axis.
//!
//! Archetypes are fixed directions, 45° apart, used for nearest-anchor
//! classification, preference filtering, and the complementary-pair
//! boost. Declaration order is the tie-break order for equidistant hues.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::distance::circular_distance;
use crate::types::point::HUE_MODULUS;

/// One of the eight fixed anchor directions on the hue axis.
///
/// Variants are declared in anchor-angle order; [`Archetype::all`]
/// returns them in that order, which is also the tie-break order used by
/// [`crate::codec::archetype_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// 0° - imaginative, future-directed
    Visionary,
    /// 45° - analytical, inquisitive
    Cognitive,
    /// 90° - loyal, dependable
    Guardian,
    /// 135° - diplomatic, cooperative
    Harmonizer,
    /// 180° - adventurous, spontaneous
    Explorer,
    /// 225° - expressive, original
    Creator,
    /// 270° - compassionate, attuned
    Empath,
    /// 315° - driven, influential
    Catalyst,
}

impl Archetype {
    /// Anchor angle in degrees.
    #[inline]
    pub const fn anchor_degrees(&self) -> f32 {
        match self {
            Self::Visionary => 0.0,
            Self::Cognitive => 45.0,
            Self::Guardian => 90.0,
            Self::Harmonizer => 135.0,
            Self::Explorer => 180.0,
            Self::Creator => 225.0,
            Self::Empath => 270.0,
            Self::Catalyst => 315.0,
        }
    }

    /// Canonical lowercase name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Visionary => "visionary",
            Self::Cognitive => "cognitive",
            Self::Guardian => "guardian",
            Self::Harmonizer => "harmonizer",
            Self::Explorer => "explorer",
            Self::Creator => "creator",
            Self::Empath => "empath",
            Self::Catalyst => "catalyst",
        }
    }

    /// The opposite anchor, 180° away.
    ///
    /// Every archetype participates in exactly one complementary pair;
    /// see [`COMPLEMENTARY_PAIRS`].
    #[inline]
    pub const fn complement(&self) -> Archetype {
        match self {
            Self::Visionary => Self::Explorer,
            Self::Cognitive => Self::Creator,
            Self::Guardian => Self::Empath,
            Self::Harmonizer => Self::Catalyst,
            Self::Explorer => Self::Visionary,
            Self::Creator => Self::Cognitive,
            Self::Empath => Self::Guardian,
            Self::Catalyst => Self::Harmonizer,
        }
    }

    /// True if `hue` falls inside this archetype's sector (anchor ± 22.5°).
    pub fn contains_hue(&self, hue: f32) -> bool {
        circular_distance(hue, self.anchor_degrees(), HUE_MODULUS) <= 22.5
    }

    /// All archetypes in anchor-angle (declaration) order.
    #[inline]
    pub const fn all() -> [Archetype; 8] {
        [
            Self::Visionary,
            Self::Cognitive,
            Self::Guardian,
            Self::Harmonizer,
            Self::Explorer,
            Self::Creator,
            Self::Empath,
            Self::Catalyst,
        ]
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown archetype: {s:?}"))
    }
}

/// The four opposite-archetype pairs eligible for the complementary boost.
///
/// Each archetype appears exactly once; the pairs are 180° apart.
pub const COMPLEMENTARY_PAIRS: [(Archetype, Archetype); 4] = [
    (Archetype::Visionary, Archetype::Explorer),
    (Archetype::Cognitive, Archetype::Creator),
    (Archetype::Guardian, Archetype::Empath),
    (Archetype::Harmonizer, Archetype::Catalyst),
];

/// Result of a nearest-anchor classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeMatch {
    /// The nearest archetype.
    pub archetype: Archetype,
    /// Its anchor angle in degrees.
    pub anchor_degrees: f32,
    /// Circular distance from the query hue to the anchor, `[0, 180]`.
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_are_45_degrees_apart() {
        let all = Archetype::all();
        for (i, archetype) in all.iter().enumerate() {
            assert_eq!(archetype.anchor_degrees(), i as f32 * 45.0);
        }
    }

    #[test]
    fn complement_is_involutive_and_opposite() {
        for archetype in Archetype::all() {
            let partner = archetype.complement();
            assert_eq!(partner.complement(), archetype);
            let gap = circular_distance(
                archetype.anchor_degrees(),
                partner.anchor_degrees(),
                HUE_MODULUS,
            );
            assert_eq!(gap, 180.0);
        }
    }

    #[test]
    fn complementary_pairs_cover_every_archetype_once() {
        let mut seen = std::collections::HashSet::new();
        for (a, b) in COMPLEMENTARY_PAIRS {
            assert!(seen.insert(a), "{a} appears twice");
            assert!(seen.insert(b), "{b} appears twice");
            assert_eq!(a.complement(), b);
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn sector_membership_wraps_at_zero() {
        assert!(Archetype::Visionary.contains_hue(350.0));
        assert!(Archetype::Visionary.contains_hue(22.5));
        assert!(!Archetype::Visionary.contains_hue(23.0));
    }

    #[test]
    fn parse_round_trips_names() {
        for archetype in Archetype::all() {
            let parsed: Archetype = archetype.name().parse().unwrap();
            assert_eq!(parsed, archetype);
        }
        assert!("oracle".parse::<Archetype>().is_err());
    }
}
