use memodb_crypto::ContentHasher;
use memodb_types::{ObjectType, Oid};
use tracing::{debug, trace, warn};

use crate::backend::{ObjectHeader, OdbBackend, RawObject};
use crate::config::MemoryBackendConfig;
use crate::error::{StoreError, StoreResult};
use crate::table::{copy_payload, ObjectRecord, ObjectTable, PutOutcome};

/// Create an in-memory backend ready to be attached to an [`Odb`](crate::Odb).
pub fn new_backend() -> Box<dyn OdbBackend> {
    Box::new(MemoryBackend::new())
}

/// What a teardown released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TeardownStats {
    /// Number of key copies released.
    pub keys: usize,
    /// Number of payload buffers released.
    pub payloads: usize,
    /// Payload bytes released.
    pub bytes: u64,
}

/// In-memory, hash-table-backed object database backend.
///
/// Intended for tests, scratch repositories and embedding. Objects live in an
/// [`ObjectTable`] keyed by their git-compatible SHA-1. Payloads are copied
/// in on write and copied out on read.
pub struct MemoryBackend {
    table: ObjectTable<Oid>,
    hasher: ContentHasher,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            table: ObjectTable::new(),
            hasher: ContentHasher::new(),
        }
    }

    /// Create a backend whose table is preallocated for
    /// `config.initial_capacity` objects.
    pub fn with_config(config: &MemoryBackendConfig) -> StoreResult<Self> {
        Ok(Self {
            table: ObjectTable::with_capacity(config.initial_capacity)?,
            hasher: ContentHasher::new(),
        })
    }

    /// Box this backend for attachment to an `Odb`.
    pub fn boxed(self) -> Box<dyn OdbBackend> {
        Box::new(self)
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Total payload bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.table.total_bytes()
    }

    /// Return a sorted list of all object ids in the backend.
    pub fn oids(&self) -> Vec<Oid> {
        let mut oids: Vec<Oid> = self.table.keys().collect();
        oids.sort();
        oids
    }

    /// Release every key and payload, reporting what was freed.
    pub fn teardown(self) -> TeardownStats {
        let mut stats = TeardownStats::default();
        for (_oid, record) in self.table.into_entries() {
            stats.keys += 1;
            stats.payloads += 1;
            stats.bytes += record.len() as u64;
        }
        debug!(
            keys = stats.keys,
            payloads = stats.payloads,
            bytes = stats.bytes,
            "memory backend released"
        );
        stats
    }

    fn copy_out(record: &ObjectRecord) -> StoreResult<RawObject> {
        Ok(RawObject {
            kind: record.kind(),
            data: copy_payload(record.data())?,
        })
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OdbBackend for MemoryBackend {
    fn exists(&self, oid: &Oid) -> bool {
        self.table.contains(oid)
    }

    fn read(&self, oid: &Oid) -> StoreResult<RawObject> {
        let record = self.table.get(oid).ok_or(StoreError::NotFound(*oid))?;
        Self::copy_out(record)
    }

    fn read_header(&self, oid: &Oid) -> StoreResult<ObjectHeader> {
        self.table
            .get(oid)
            .map(ObjectRecord::header)
            .ok_or(StoreError::NotFound(*oid))
    }

    fn read_prefix(&self, short: &Oid, nibbles: usize) -> StoreResult<(Oid, RawObject)> {
        match self.table.scan_prefix(short, nibbles) {
            Some((oid, record)) => Ok((oid, Self::copy_out(record)?)),
            None => Err(StoreError::PrefixNotFound {
                prefix: short.to_hex_prefix(nibbles),
                nibbles,
            }),
        }
    }

    fn write(&mut self, data: &[u8], kind: ObjectType) -> StoreResult<Oid> {
        let oid = self.hasher.hash(kind, data)?;
        let header = ObjectHeader {
            kind,
            len: data.len(),
        };
        match self.table.put(oid, kind, data)? {
            PutOutcome::Inserted => trace!(%oid, %kind, len = data.len(), "object stored"),
            PutOutcome::Replaced { previous } if previous != header => warn!(
                %oid,
                previous_kind = %previous.kind,
                previous_len = previous.len,
                %kind,
                len = data.len(),
                "object overwritten with a different header"
            ),
            PutOutcome::Replaced { .. } => trace!(%oid, "object rewritten"),
        }
        Ok(oid)
    }

    fn free(self: Box<Self>) {
        (*self).teardown();
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("object_count", &self.len())
            .finish()
    }
}
