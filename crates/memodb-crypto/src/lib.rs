//! Content hashing for memodb.
//!
//! Object identifiers are the SHA-1 of a `"<type> <len>\0"` header followed
//! by the payload, which keeps them byte-for-byte compatible with git.
//!
//! All crypto operations wrap established libraries — no custom cryptography.

pub mod hasher;

pub use hasher::{ContentHasher, HashError};
