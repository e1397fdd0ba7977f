use memodb_types::{ObjectType, Oid};
use sha1::{Digest, Sha1};

/// Git-compatible SHA-1 content hasher.
///
/// The hash covers a `"<type> <len>\0"` header and then the payload, so two
/// objects with identical bytes but different kinds get different ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentHasher;

impl ContentHasher {
    pub const fn new() -> Self {
        Self
    }

    /// The object header that prefixes the payload in the hash input.
    pub fn header(kind: ObjectType, len: usize) -> String {
        format!("{} {}\0", kind.as_str(), len)
    }

    /// Compute the object id of `(kind, data)`.
    ///
    /// Fails for kinds that never exist as standalone objects.
    pub fn hash(&self, kind: ObjectType, data: &[u8]) -> Result<Oid, HashError> {
        if !kind.is_loose() {
            return Err(HashError::UnhashableType(kind));
        }
        let mut hasher = Sha1::new();
        hasher.update(Self::header(kind, data.len()).as_bytes());
        hasher.update(data);
        Ok(Oid::from_raw(hasher.finalize().into()))
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HashError {
    #[error("cannot hash object of type {0}")]
    UnhashableType(ObjectType),
}
