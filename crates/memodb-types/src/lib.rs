//! Foundation types for memodb.
//!
//! Every other memodb crate depends on `memodb-types`.
//!
//! # Key Types
//!
//! - [`Oid`] — 20-byte content-addressed object identifier
//! - [`ObjectType`] — the host object kind stored alongside each payload
//! - [`TypeError`] — parse failures for the above

pub mod error;
pub mod kind;
pub mod oid;

pub use error::TypeError;
pub use kind::ObjectType;
pub use oid::{Oid, OID_HEXSZ, OID_RAWSZ};
