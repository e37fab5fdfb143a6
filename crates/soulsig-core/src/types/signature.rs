//! The compact signature type.
//!
//! A [`Signature`] is the wire form of a [`super::PersonalityPoint`]:
//! three bytes, one per dimension, rendered as `#` plus 6 uppercase hex
//! digits in `[hue, manifested, soul]` order. The string format is
//! bit-exact and exposed to external callers; see [`crate::codec`] for
//! the conversion functions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A 6-hex-digit personality signature.
///
/// Byte order is `[hue, manifested, soul]`, each quantized to `[0, 255]`.
/// Quantization is lossy: the hue step is ≈ 1.41° and the linear step is
/// 1 unit.
///
/// # Examples
///
/// ```
/// use soulsig_core::types::Signature;
///
/// let sig: Signature = "#20A0FF".parse().unwrap();
/// assert_eq!(sig.to_string(), "#20A0FF");
/// assert_eq!(sig.bytes(), [0x20, 0xA0, 0xFF]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature([u8; 3]);

impl Signature {
    /// Build a signature from raw dimension bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// The raw dimension bytes, `[hue, manifested, soul]`.
    #[inline]
    pub const fn bytes(&self) -> [u8; 3] {
        self.0
    }

    /// Hue byte (quantized from `[0, 360)`).
    #[inline]
    pub const fn hue_byte(&self) -> u8 {
        self.0[0]
    }

    /// Manifested byte.
    #[inline]
    pub const fn manifested_byte(&self) -> u8 {
        self.0[1]
    }

    /// Soul byte.
    #[inline]
    pub const fn soul_byte(&self) -> u8 {
        self.0[2]
    }

    /// Parse from a string of exactly 6 hex digits, with an optional
    /// leading `#`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValidationError`] when the input is not
    /// exactly 6 hex digits after stripping the prefix.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let hex = input.strip_prefix('#').unwrap_or(input);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::ValidationError {
                field: "signature".to_string(),
                message: format!("expected 6 hex digits, got {input:?}"),
            });
        }
        let mut bytes = [0u8; 3];
        for (i, byte) in bytes.iter_mut().enumerate() {
            // Slicing is safe: all 6 chars are ASCII hex digits.
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|e| {
                CoreError::ValidationError {
                    field: "signature".to_string(),
                    message: e.to_string(),
                }
            })?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for Signature {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Signature {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        Self::parse(&value)
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_string()
    }
}
