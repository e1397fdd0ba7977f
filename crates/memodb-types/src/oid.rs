use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Size of a raw object identifier in bytes.
pub const OID_RAWSZ: usize = 20;

/// Size of a hex-encoded object identifier (one character per nibble).
pub const OID_HEXSZ: usize = OID_RAWSZ * 2;

/// Content-addressed identifier for a stored object.
///
/// An `Oid` is the SHA-1 of an object's header and payload. Identical
/// `(type, payload)` pairs always produce the same `Oid`, so the identifier
/// both names and verifies the object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Oid([u8; OID_RAWSZ]);

impl Oid {
    /// Create an `Oid` from a pre-computed hash.
    pub const fn from_raw(raw: [u8; OID_RAWSZ]) -> Self {
        Self(raw)
    }

    /// The all-zero identifier. No object hashes to it in practice.
    pub const fn zero() -> Self {
        Self([0u8; OID_RAWSZ])
    }

    /// The raw 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; OID_RAWSZ] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 7 characters).
    pub fn short_hex(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }

    /// Hex representation of the leading `nibbles` half-bytes.
    pub fn to_hex_prefix(&self, nibbles: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(nibbles.min(OID_HEXSZ));
        hex
    }

    /// Parse a full 40-character hex identifier.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != OID_HEXSZ {
            return Err(TypeError::InvalidLength {
                expected: OID_HEXSZ,
                actual: s.len(),
            });
        }
        let (oid, _) = Self::from_hex_prefix(s)?;
        Ok(oid)
    }

    /// Parse an abbreviated hex identifier.
    ///
    /// Accepts 0 to 40 hex characters. Odd lengths are allowed: the missing
    /// low nibble and every byte past the prefix are zero. Returns the padded
    /// `Oid` together with the number of significant nibbles.
    pub fn from_hex_prefix(s: &str) -> Result<(Self, usize), TypeError> {
        let nibbles = s.len();
        if nibbles > OID_HEXSZ {
            return Err(TypeError::InvalidLength {
                expected: OID_HEXSZ,
                actual: nibbles,
            });
        }
        let mut padded = String::with_capacity(nibbles + 1);
        padded.push_str(s);
        if nibbles % 2 == 1 {
            padded.push('0');
        }
        let bytes = hex::decode(&padded).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let mut raw = [0u8; OID_RAWSZ];
        raw[..bytes.len()].copy_from_slice(&bytes);
        Ok((Self(raw), nibbles))
    }

    /// Returns `true` if the leading `nibbles` half-bytes of `self` equal
    /// those of `prefix`.
    pub fn matches_prefix(&self, prefix: &Oid, nibbles: usize) -> bool {
        prefix_eq(&self.0, &prefix.0, nibbles)
    }
}

/// Compare the leading `nibbles` half-bytes of two byte strings.
///
/// `nibbles` is clamped to the length of the shorter input, so a request
/// wider than the key compares the whole key. Zero nibbles always match.
pub fn prefix_eq(a: &[u8], b: &[u8], nibbles: usize) -> bool {
    let nibbles = nibbles.min(a.len() * 2).min(b.len() * 2);
    let full = nibbles / 2;
    if a[..full] != b[..full] {
        return false;
    }
    if nibbles % 2 == 1 {
        return (a[full] >> 4) == (b[full] >> 4);
    }
    true
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.short_hex())
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Oid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; OID_RAWSZ]> for Oid {
    fn from(raw: [u8; OID_RAWSZ]) -> Self {
        Self(raw)
    }
}

impl From<Oid> for [u8; OID_RAWSZ] {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<[u8]> for Oid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
