use std::collections::HashMap;
use std::hash::BuildHasher;

use memodb_types::{ObjectType, Oid};

use crate::backend::ObjectHeader;
use crate::error::{StoreError, StoreResult};
use crate::key::{BuildKeyHasher, Slot, TableKey};

/// One stored object: kind tag, length and a private copy of the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectRecord {
    kind: ObjectType,
    len: usize,
    data: Vec<u8>,
}

impl ObjectRecord {
    fn new(kind: ObjectType, data: Vec<u8>) -> Self {
        Self {
            kind,
            len: data.len(),
            data,
        }
    }

    pub fn kind(&self) -> ObjectType {
        self.kind
    }

    /// Payload length. Always equal to `self.data().len()`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn header(&self) -> ObjectHeader {
        ObjectHeader {
            kind: self.kind,
            len: self.len,
        }
    }
}

/// What [`ObjectTable::put`] did with the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutOutcome {
    /// The key was new; a record was inserted.
    Inserted,
    /// The key existed; its record was overwritten in place.
    Replaced { previous: ObjectHeader },
}

/// Copy `payload` into a freshly allocated buffer, reporting allocation
/// failure instead of aborting.
pub(crate) fn copy_payload(payload: &[u8]) -> StoreResult<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(payload.len())
        .map_err(|_| StoreError::OutOfMemory {
            requested: payload.len(),
        })?;
    data.extend_from_slice(payload);
    Ok(data)
}

/// Map from fixed-width key to [`ObjectRecord`].
///
/// Keys are stored by value and payloads are copied in on `put`, so the
/// table never aliases caller memory. There is no removal: entries are
/// added or overwritten, and the whole table is released at once when
/// dropped.
///
/// Prefix lookup is a linear scan with no secondary index. Iteration order,
/// and therefore which entry wins for an ambiguous prefix, is unspecified.
pub struct ObjectTable<K: TableKey = Oid, S: BuildHasher = BuildKeyHasher> {
    entries: HashMap<Slot<K>, ObjectRecord, S>,
}

impl<K: TableKey> ObjectTable<K, BuildKeyHasher> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::with_hasher(BuildKeyHasher)
    }

    /// Create an empty table with room for `capacity` entries.
    ///
    /// Fails with [`StoreError::OutOfMemory`] when the buckets cannot be
    /// allocated.
    pub fn with_capacity(capacity: usize) -> StoreResult<Self> {
        let mut table = Self::new();
        table
            .entries
            .try_reserve(capacity)
            .map_err(|_| StoreError::OutOfMemory {
                requested: capacity,
            })?;
        Ok(table)
    }
}

impl<K: TableKey> Default for ObjectTable<K, BuildKeyHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TableKey, S: BuildHasher> ObjectTable<K, S> {
    /// Create an empty table using a custom hashing strategy.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            entries: HashMap::with_hasher(hasher),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total payload bytes across all records.
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|r| r.len as u64).sum()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(&Slot(*key))
    }

    pub fn get(&self, key: &K) -> Option<&ObjectRecord> {
        self.entries.get(&Slot(*key))
    }

    /// Insert a record for `key`, or overwrite the existing one in place.
    ///
    /// The payload copy and any table growth are allocated before the map is
    /// touched; on `OutOfMemory` the table is unchanged.
    pub fn put(&mut self, key: K, kind: ObjectType, payload: &[u8]) -> StoreResult<PutOutcome> {
        let data = copy_payload(payload)?;
        let slot = Slot(key);

        if let Some(record) = self.entries.get_mut(&slot) {
            let previous = record.header();
            // The old payload is dropped here; the key is kept as-is.
            *record = ObjectRecord::new(kind, data);
            return Ok(PutOutcome::Replaced { previous });
        }

        self.entries
            .try_reserve(1)
            .map_err(|_| StoreError::OutOfMemory {
                requested: std::mem::size_of::<(Slot<K>, ObjectRecord)>(),
            })?;
        self.entries.insert(slot, ObjectRecord::new(kind, data));
        Ok(PutOutcome::Inserted)
    }

    /// First entry whose key starts with the leading `nibbles` half-bytes of
    /// `prefix`. O(n).
    pub fn scan_prefix(&self, prefix: &K, nibbles: usize) -> Option<(K, &ObjectRecord)> {
        self.entries
            .iter()
            .find(|(slot, _)| slot.0.matches_prefix(prefix, nibbles))
            .map(|(slot, record)| (slot.0, record))
    }

    /// Iterate over all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &ObjectRecord)> + '_ {
        self.entries.iter().map(|(slot, record)| (slot.0, record))
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.keys().map(|slot| slot.0)
    }

    /// Consume the table, yielding every owned entry.
    pub fn into_entries(self) -> impl Iterator<Item = (K, ObjectRecord)> {
        self.entries
            .into_iter()
            .map(|(slot, record)| (slot.0, record))
    }
}

impl<K: TableKey, S: BuildHasher> std::fmt::Debug for ObjectTable<K, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectTable")
            .field("entries", &self.len())
            .field("bytes", &self.total_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::RandomState;

    fn oid(byte: u8) -> Oid {
        Oid::from_raw([byte; 20])
    }

    #[test]
    fn new_table_is_empty() {
        let table: ObjectTable = ObjectTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.total_bytes(), 0);
        assert!(table.scan_prefix(&oid(0), 0).is_none());
    }

    #[test]
    fn put_then_get() {
        let mut table = ObjectTable::new();
        let outcome = table.put(oid(1), ObjectType::Blob, b"hello").unwrap();
        assert_eq!(outcome, PutOutcome::Inserted);
        assert!(table.contains(&oid(1)));

        let record = table.get(&oid(1)).unwrap();
        assert_eq!(record.kind(), ObjectType::Blob);
        assert_eq!(record.len(), 5);
        assert_eq!(record.data(), b"hello");
    }

    #[test]
    fn put_copies_the_payload() {
        let mut table = ObjectTable::new();
        let mut payload = b"mutable".to_vec();
        table.put(oid(2), ObjectType::Blob, &payload).unwrap();
        payload[0] = b'X';
        assert_eq!(table.get(&oid(2)).unwrap().data(), b"mutable");
    }

    #[test]
    fn second_put_replaces_in_place() {
        let mut table = ObjectTable::new();
        table.put(oid(3), ObjectType::Blob, b"first").unwrap();
        let outcome = table.put(oid(3), ObjectType::Tag, b"second!").unwrap();

        assert_eq!(
            outcome,
            PutOutcome::Replaced {
                previous: ObjectHeader {
                    kind: ObjectType::Blob,
                    len: 5
                }
            }
        );
        assert_eq!(table.len(), 1);
        let record = table.get(&oid(3)).unwrap();
        assert_eq!(record.kind(), ObjectType::Tag);
        assert_eq!(record.len(), 7);
        assert_eq!(record.data(), b"second!");
    }

    #[test]
    fn empty_payload_is_stored() {
        let mut table = ObjectTable::new();
        table.put(oid(4), ObjectType::Tree, b"").unwrap();
        let record = table.get(&oid(4)).unwrap();
        assert!(record.is_empty());
        assert_eq!(record.data(), b"");
    }

    #[test]
    fn missing_key_is_absent() {
        let mut table = ObjectTable::new();
        table.put(oid(5), ObjectType::Blob, b"x").unwrap();
        assert!(!table.contains(&oid(6)));
        assert!(table.get(&oid(6)).is_none());
    }

    #[test]
    fn scan_prefix_finds_match() {
        let mut table = ObjectTable::new();
        let mut raw = [0u8; 20];
        raw[0] = 0xab;
        raw[1] = 0xcd;
        let target = Oid::from_raw(raw);
        table.put(target, ObjectType::Blob, b"target").unwrap();
        table.put(oid(0x11), ObjectType::Blob, b"other").unwrap();

        let (prefix, nibbles) = Oid::from_hex_prefix("abc").unwrap();
        let (found, record) = table.scan_prefix(&prefix, nibbles).unwrap();
        assert_eq!(found, target);
        assert_eq!(record.data(), b"target");

        let (miss, nibbles) = Oid::from_hex_prefix("abd").unwrap();
        assert!(table.scan_prefix(&miss, nibbles).is_none());
    }

    #[test]
    fn ambiguous_prefix_returns_exactly_one() {
        let mut table = ObjectTable::new();
        let mut a = [0u8; 20];
        a[0] = 0x12;
        a[19] = 1;
        let mut b = a;
        b[19] = 2;
        table.put(Oid::from_raw(a), ObjectType::Blob, b"a").unwrap();
        table.put(Oid::from_raw(b), ObjectType::Blob, b"b").unwrap();

        let (prefix, nibbles) = Oid::from_hex_prefix("12").unwrap();
        let (found, _) = table.scan_prefix(&prefix, nibbles).unwrap();
        assert!(found == Oid::from_raw(a) || found == Oid::from_raw(b));
        let matching = table
            .iter()
            .filter(|(key, _)| key.matches_prefix(&prefix, nibbles))
            .count();
        assert_eq!(matching, 2);
    }

    #[test]
    fn total_bytes_sums_payloads() {
        let mut table = ObjectTable::new();
        table.put(oid(1), ObjectType::Blob, b"12345").unwrap();
        table.put(oid(2), ObjectType::Blob, b"123456789").unwrap();
        assert_eq!(table.total_bytes(), 14);
    }

    #[test]
    fn works_with_other_key_widths_and_hashers() {
        let mut table: ObjectTable<[u8; 4], RandomState> =
            ObjectTable::with_hasher(RandomState::new());
        table.put([1, 2, 3, 4], ObjectType::Blob, b"four").unwrap();
        assert!(table.contains(&[1, 2, 3, 4]));
        assert_eq!(table.keys().collect::<Vec<_>>(), vec![[1u8, 2, 3, 4]]);
    }

    #[test]
    fn into_entries_yields_everything() {
        let mut table = ObjectTable::with_capacity(4).unwrap();
        table.put(oid(1), ObjectType::Blob, b"a").unwrap();
        table.put(oid(2), ObjectType::Blob, b"b").unwrap();
        let mut keys: Vec<Oid> = table.into_entries().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(keys, vec![oid(1), oid(2)]);
    }

    #[test]
    fn unallocatable_capacity_is_out_of_memory() {
        let err = ObjectTable::<Oid>::with_capacity(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            StoreError::OutOfMemory {
                requested: usize::MAX
            }
        );
    }

    #[test]
    fn debug_format() {
        let mut table = ObjectTable::new();
        table.put(oid(1), ObjectType::Blob, b"x").unwrap();
        let debug = format!("{table:?}");
        assert!(debug.contains("ObjectTable"));
        assert!(debug.contains("entries: 1"));
    }
}
