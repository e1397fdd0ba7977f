use memodb_crypto::ContentHasher;
use memodb_types::{ObjectType, Oid, OID_HEXSZ};
use tracing::debug;

use crate::backend::{ObjectHeader, OdbBackend, RawObject};
use crate::config::OdbConfig;
use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryBackend;

struct Attached {
    backend: Box<dyn OdbBackend>,
    priority: i32,
}

/// Object database: a priority-ordered set of backends behind one API.
///
/// Backends are consulted from highest to lowest priority; backends with
/// equal priority keep their attachment order. Reads fall through to the
/// next backend only on a miss, any other error is returned immediately.
/// Writes go to the highest-priority backend.
///
/// Dropping the `Odb` frees every attached backend exactly once.
pub struct Odb {
    backends: Vec<Attached>,
    hasher: ContentHasher,
}

impl Odb {
    /// Create an object database with no backends.
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
            hasher: ContentHasher::new(),
        }
    }

    /// Create an object database with an in-memory backend attached as
    /// described by `config`.
    pub fn from_config(config: &OdbConfig) -> StoreResult<Self> {
        let mut odb = Self::new();
        odb.add_backend(
            MemoryBackend::with_config(&config.memory)?.boxed(),
            config.memory.priority,
        );
        Ok(odb)
    }

    /// Attach a backend. Higher priorities are preferred.
    pub fn add_backend(&mut self, backend: Box<dyn OdbBackend>, priority: i32) {
        let pos = self
            .backends
            .iter()
            .position(|a| a.priority < priority)
            .unwrap_or(self.backends.len());
        self.backends.insert(pos, Attached { backend, priority });
        debug!(priority, position = pos, "odb backend attached");
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Compute the object id of `(kind, data)` without storing it.
    pub fn hash(&self, data: &[u8], kind: ObjectType) -> StoreResult<Oid> {
        Ok(self.hasher.hash(kind, data)?)
    }

    pub fn exists(&self, oid: &Oid) -> bool {
        self.backends.iter().any(|a| a.backend.exists(oid))
    }

    pub fn read(&self, oid: &Oid) -> StoreResult<RawObject> {
        for attached in &self.backends {
            match attached.backend.read(oid) {
                Err(e) if e.is_not_found() => continue,
                other => return other,
            }
        }
        Err(StoreError::NotFound(*oid))
    }

    pub fn read_header(&self, oid: &Oid) -> StoreResult<ObjectHeader> {
        for attached in &self.backends {
            match attached.backend.read_header(oid) {
                Err(e) if e.is_not_found() => continue,
                other => return other,
            }
        }
        Err(StoreError::NotFound(*oid))
    }

    /// Resolve an abbreviated id across all backends.
    ///
    /// A full-width prefix is an exact read. Otherwise every backend is asked;
    /// if two of them resolve the prefix to different objects the result is
    /// `Ambiguous`. Within a single backend an ambiguous prefix resolves to
    /// whichever match that backend returns.
    pub fn read_prefix(&self, short: &Oid, nibbles: usize) -> StoreResult<(Oid, RawObject)> {
        if nibbles >= OID_HEXSZ {
            return self.read(short).map(|obj| (*short, obj));
        }

        let mut found: Option<(Oid, RawObject)> = None;
        for attached in &self.backends {
            match attached.backend.read_prefix(short, nibbles) {
                Ok((oid, obj)) => match found.as_ref().map(|(prev, _)| *prev) {
                    Some(prev) if prev != oid => {
                        return Err(StoreError::Ambiguous {
                            prefix: short.to_hex_prefix(nibbles),
                            nibbles,
                        });
                    }
                    Some(_) => {}
                    None => found = Some((oid, obj)),
                },
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        found.ok_or_else(|| StoreError::PrefixNotFound {
            prefix: short.to_hex_prefix(nibbles),
            nibbles,
        })
    }

    /// Store an object in the highest-priority backend.
    pub fn write(&mut self, data: &[u8], kind: ObjectType) -> StoreResult<Oid> {
        let attached = self.backends.first_mut().ok_or(StoreError::NoBackend)?;
        attached.backend.write(data, kind)
    }
}

impl Default for Odb {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Odb {
    fn drop(&mut self) {
        for attached in self.backends.drain(..) {
            attached.backend.free();
        }
    }
}

impl std::fmt::Debug for Odb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let priorities: Vec<i32> = self.backends.iter().map(|a| a.priority).collect();
        f.debug_struct("Odb")
            .field("backend_priorities", &priorities)
            .finish()
    }
}
