use memodb_types::{ObjectType, Oid};

use crate::error::StoreResult;

/// Kind and length of a stored object, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectHeader {
    pub kind: ObjectType,
    pub len: usize,
}

/// An object handed out by a read. The buffer belongs to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawObject {
    pub kind: ObjectType,
    pub data: Vec<u8>,
}

impl RawObject {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn header(&self) -> ObjectHeader {
        ObjectHeader {
            kind: self.kind,
            len: self.data.len(),
        }
    }
}

/// Pluggable object database backend.
///
/// An [`Odb`](crate::Odb) holds backends as `Box<dyn OdbBackend>` and calls
/// them uniformly. All implementations must satisfy these invariants:
/// - The key of every stored object is the content hash of its
///   `(kind, payload)`; callers never choose it.
/// - Reads return buffers the caller owns. Internal storage is never lent out.
/// - A miss is `StoreError::NotFound` (or `PrefixNotFound`) and has no side
///   effects.
/// - Failed writes leave the backend unchanged.
/// - Operations run to completion on the caller's thread; backends are not
///   internally synchronized.
pub trait OdbBackend: Send {
    /// Check whether an object exists.
    fn exists(&self, oid: &Oid) -> bool;

    /// Read an object, returning a fresh copy of its payload.
    fn read(&self, oid: &Oid) -> StoreResult<RawObject>;

    /// Read only the kind and length of an object.
    fn read_header(&self, oid: &Oid) -> StoreResult<ObjectHeader>;

    /// Resolve an abbreviated id and read the object it names.
    ///
    /// Only the leading `nibbles` half-bytes of `short` are significant. If
    /// several objects match, one of them is returned; which one is
    /// implementation-defined.
    fn read_prefix(&self, short: &Oid, nibbles: usize) -> StoreResult<(Oid, RawObject)>;

    /// Store `data` as an object of `kind` and return its content hash.
    fn write(&mut self, data: &[u8], kind: ObjectType) -> StoreResult<Oid>;

    /// Tear the backend down, releasing everything it owns.
    fn free(self: Box<Self>);
}
