//! In-memory content-addressed object storage for memodb.
//!
//! Objects are raw byte payloads tagged with an [`ObjectType`] and keyed by
//! their [`Oid`], the SHA-1 of the type header and payload.
//!
//! # Layers
//!
//! - [`KeyHasher`] / [`TableKey`] — bucket hashing and equality for
//!   fixed-width keys
//! - [`ObjectTable`] — owned-key, owned-value map with prefix scan
//! - [`OdbBackend`] — the six-operation backend contract
//! - [`MemoryBackend`] — the in-memory backend built on `ObjectTable`
//! - [`Odb`] — dispatcher that consults several backends by priority
//!
//! # Design Rules
//!
//! 1. The stored key is always the content hash of the stored value.
//! 2. Reads hand out fresh copies; table buffers never escape.
//! 3. Failed operations leave the table exactly as it was.
//! 4. Backends are single-threaded; callers serialize access.
//! 5. The store never interprets object contents.
//!
//! [`ObjectType`]: memodb_types::ObjectType
//! [`Oid`]: memodb_types::Oid

pub mod backend;
pub mod config;
pub mod error;
pub mod key;
pub mod memory;
pub mod odb;
pub mod table;

// Re-export primary types at crate root for ergonomic imports.
pub use backend::{ObjectHeader, OdbBackend, RawObject};
pub use config::{MemoryBackendConfig, OdbConfig};
pub use error::{StoreError, StoreResult};
pub use key::{oid_hash, BuildKeyHasher, KeyHasher, TableKey};
pub use memory::{MemoryBackend, TeardownStats};
pub use odb::Odb;
pub use table::{ObjectRecord, ObjectTable, PutOutcome};
