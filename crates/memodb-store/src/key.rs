//! Bucket hashing and equality for fixed-width table keys.
//!
//! The object table does not use the std `Hash` impl of its keys. Instead it
//! hashes and compares the raw key bytes through [`TableKey`], with
//! [`BuildKeyHasher`] as the hashing strategy. The hash only spreads keys
//! across buckets; it has no cryptographic role.

use std::hash::{BuildHasher, Hash, Hasher};

use memodb_types::oid::prefix_eq;
use memodb_types::Oid;

/// A fixed-width key the object table can store.
///
/// Hashing and equality are defined purely by [`TableKey::key_bytes`], so two
/// keys with the same bytes are interchangeable regardless of where they
/// came from.
pub trait TableKey: Copy + Eq {
    fn key_bytes(&self) -> &[u8];

    /// Returns `true` if the leading `nibbles` half-bytes of `self` equal
    /// those of `prefix`.
    fn matches_prefix(&self, prefix: &Self, nibbles: usize) -> bool {
        prefix_eq(self.key_bytes(), prefix.key_bytes(), nibbles)
    }
}

impl TableKey for Oid {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<const N: usize> TableKey for [u8; N] {
    fn key_bytes(&self) -> &[u8] {
        self
    }
}

/// Polynomial rolling hash over key bytes.
///
/// Seeds with the first byte, then folds each following byte as
/// `h = (h << 5) - h + byte`, i.e. `31 * h + byte`, wrapping at 32 bits.
pub fn oid_hash(bytes: &[u8]) -> u32 {
    let mut hasher = KeyHasher::default();
    hasher.write(bytes);
    hasher.state.unwrap_or(0)
}

#[inline]
fn fold(h: u32, byte: u8) -> u32 {
    (h << 5).wrapping_sub(h).wrapping_add(u32::from(byte))
}

/// [`Hasher`] implementing [`oid_hash`].
///
/// Bytes from successive `write` calls are folded as one stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyHasher {
    state: Option<u32>,
}

impl Hasher for KeyHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = Some(match self.state {
                None => u32::from(byte),
                Some(h) => fold(h, byte),
            });
        }
    }

    /// The 32-bit hash is mirrored into the upper half of the `u64`.
    fn finish(&self) -> u64 {
        let h = u64::from(self.state.unwrap_or(0));
        (h << 32) | h
    }
}

/// Hashing strategy handed to the table's map.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildKeyHasher;

impl BuildHasher for BuildKeyHasher {
    type Hasher = KeyHasher;

    fn build_hasher(&self) -> KeyHasher {
        KeyHasher::default()
    }
}

/// Map key wrapper that routes `Hash` and `Eq` through [`TableKey`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Slot<K>(pub(crate) K);

impl<K: TableKey> Hash for Slot<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.0.key_bytes());
    }
}

impl<K: TableKey> PartialEq for Slot<K> {
    fn eq(&self, other: &Self) -> bool {
        self.0.key_bytes() == other.0.key_bytes()
    }
}

impl<K: TableKey> Eq for Slot<K> {}
