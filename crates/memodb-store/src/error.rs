use memodb_crypto::HashError;
use memodb_types::Oid;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(Oid),

    /// No stored object starts with the given prefix.
    #[error("no object matches prefix {prefix} ({nibbles} nibbles)")]
    PrefixNotFound { prefix: String, nibbles: usize },

    /// Copying a payload or growing the table failed to allocate.
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },

    /// The content hash of an object could not be computed.
    #[error("hash failure: {0}")]
    HashFailure(#[from] HashError),

    /// Different backends resolved the prefix to different objects.
    #[error("ambiguous prefix {prefix} ({nibbles} nibbles)")]
    Ambiguous { prefix: String, nibbles: usize },

    /// The object database has no backend to write to.
    #[error("no backend attached")]
    NoBackend,
}

impl StoreError {
    /// Returns `true` for both exact and prefix misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::PrefixNotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
