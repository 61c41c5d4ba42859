use std::collections::VecDeque;

use dtlv_types::{CapacityTable, RecordTag};
use tracing::{debug, warn};

use crate::error::StoreError;

/// What to do with a payload longer than its tag's limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OversizePolicy {
    /// Keep the first `max` bytes and drop the rest.
    #[default]
    Truncate,
    /// Refuse the record with [`StoreError::OversizedPayload`].
    Reject,
}

/// What to do when a sequential store already holds `max_records`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreFullPolicy {
    /// Refuse the record with [`StoreError::RecordLimitReached`].
    #[default]
    Reject,
    /// Drop the oldest record to make room.
    EvictOldest,
}

/// How record bytes are held.
///
/// ```text
/// ┌─────────────┬────────────────────────────────────────────────────┐
/// │ Mode        │ Storage                                            │
/// ├─────────────┼────────────────────────────────────────────────────┤
/// │ Sequential  │ each record owns a fresh buffer of exactly `max`   │
/// │             │ bytes, released on clear / eviction / drop         │
/// │ PerTagSlot  │ one preallocated `max`-byte slot per table entry;  │
/// │             │ a later record with the same tag overwrites it     │
/// └─────────────┴────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageMode {
    #[default]
    Sequential,
    PerTagSlot,
}

/// A record copied into store-owned memory.
///
/// The backing buffer is always exactly the tag's capacity; only the
/// first `len` bytes are meaningful and only those are exposed.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredRecord {
    tag: u8,
    id: Option<u16>,
    len: u16,
    declared: usize,
    buf: Box<[u8]>,
}

impl StoredRecord {
    #[must_use]
    pub fn tag(&self) -> u8 {
        self.tag
    }

    #[must_use]
    pub fn record_tag(&self) -> RecordTag {
        RecordTag::from_wire_id(self.tag)
    }

    #[must_use]
    pub fn id(&self) -> Option<u16> {
        self.id
    }

    /// Number of stored payload bytes.
    #[must_use]
    pub fn len(&self) -> u16 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length the record had on the wire, before any truncation.
    #[must_use]
    pub fn declared_len(&self) -> usize {
        self.declared
    }

    #[must_use]
    pub fn was_truncated(&self) -> bool {
        self.declared > usize::from(self.len)
    }

    /// Size of the owned buffer, i.e. the tag's capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }

    fn fill(&mut self, id: Option<u16>, bytes: &[u8], declared: usize) {
        self.buf[..bytes.len()].copy_from_slice(bytes);
        self.id = id;
        // bytes.len() <= buf.len() <= u16::MAX, checked by the caller.
        self.len = u16::try_from(bytes.len()).unwrap_or(u16::MAX);
        self.declared = declared;
    }
}

impl std::fmt::Debug for StoredRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredRecord")
            .field("tag", &self.record_tag())
            .field("id", &self.id)
            .field("len", &self.len)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

/// Result of a successful [`RecordStore::put`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PutOutcome {
    /// Position of the written record in [`RecordStore::iter`] order.
    pub index: usize,
    /// The payload was clipped to the tag's limit.
    pub truncated: bool,
    /// The oldest record was dropped to make room.
    pub evicted: bool,
    /// An existing per-tag slot was overwritten in place.
    pub overwrote: bool,
}

/// Fixed-capacity ordered collection of records in owned storage.
///
/// Every copy is bounded by the tag's entry in the [`CapacityTable`]:
/// whatever length a record claims, at most `max` bytes are copied.
/// A `put` that fails leaves the store exactly as it was.
///
/// The store is a plain value. Create it with [`new`](Self::new), empty it
/// with [`clear`](Self::clear), and it is released on drop; share it
/// across calls by `&mut`.
pub struct RecordStore {
    table: CapacityTable,
    max_records: usize,
    mode: StorageMode,
    oversize: OversizePolicy,
    when_full: StoreFullPolicy,
    records: VecDeque<StoredRecord>,
    /// Preallocated slot buffers, indexed by tag. Only used in
    /// `PerTagSlot` mode; a buffer moves into `records` while its tag is live.
    slots: Vec<Option<Box<[u8]>>>,
}

impl RecordStore {
    /// A sequential store with truncation and reject-when-full.
    #[must_use]
    pub fn new(table: CapacityTable, max_records: usize) -> Self {
        Self {
            table,
            max_records,
            mode: StorageMode::Sequential,
            oversize: OversizePolicy::default(),
            when_full: StoreFullPolicy::default(),
            records: VecDeque::new(),
            slots: Vec::new(),
        }
    }

    /// Switch storage mode. Slot buffers are allocated here, once.
    ///
    /// Any records already held are dropped.
    #[must_use]
    pub fn with_mode(mut self, mode: StorageMode) -> Self {
        self.records.clear();
        self.mode = mode;
        self.slots = match mode {
            StorageMode::Sequential => Vec::new(),
            StorageMode::PerTagSlot => (0..=u8::MAX)
                .map(|tag| {
                    self.table
                        .lookup(tag)
                        .map(|max| vec![0u8; usize::from(max)].into_boxed_slice())
                })
                .collect(),
        };
        self
    }

    #[must_use]
    pub fn with_oversize_policy(mut self, policy: OversizePolicy) -> Self {
        self.oversize = policy;
        self
    }

    #[must_use]
    pub fn with_full_policy(mut self, policy: StoreFullPolicy) -> Self {
        self.when_full = policy;
        self
    }

    /// Copy a payload into owned storage.
    ///
    /// Steps, in order, all before anything is mutated:
    ///
    ///   1. Look up the tag's limit; unknown tag is an error.
    ///   2. Apply the oversize policy: clip to `max` or reject.
    ///   3. Find room: an existing slot, a free position, or (with
    ///      `EvictOldest`) the oldest record's position.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Type`] wrapping `UnknownTag`.
    /// - [`StoreError::OversizedPayload`] under [`OversizePolicy::Reject`].
    /// - [`StoreError::RecordLimitReached`] when full and not evicting.
    pub fn put(
        &mut self,
        tag: u8,
        id: Option<u16>,
        payload: &[u8],
    ) -> Result<PutOutcome, StoreError> {
        let max = self.table.require(tag)?;
        let limit = usize::from(max);

        let truncated = payload.len() > limit;
        if truncated && self.oversize == OversizePolicy::Reject {
            return Err(StoreError::OversizedPayload {
                tag,
                declared: payload.len(),
                max,
            });
        }
        let bytes = &payload[..payload.len().min(limit)];
        if truncated {
            warn!(
                tag,
                declared = payload.len(),
                max,
                "truncating payload to tag capacity"
            );
        }

        let outcome = match self.mode {
            StorageMode::Sequential => self.put_sequential(tag, id, bytes, payload.len())?,
            StorageMode::PerTagSlot => self.put_slot(tag, id, bytes, payload.len())?,
        };
        debug!(
            tag,
            stored = bytes.len(),
            index = outcome.index,
            "record stored"
        );
        Ok(PutOutcome {
            truncated,
            ..outcome
        })
    }

    fn put_sequential(
        &mut self,
        tag: u8,
        id: Option<u16>,
        bytes: &[u8],
        declared: usize,
    ) -> Result<PutOutcome, StoreError> {
        let full = self.records.len() >= self.max_records;
        if full && (self.when_full == StoreFullPolicy::Reject || self.max_records == 0) {
            return Err(StoreError::RecordLimitReached {
                max_records: self.max_records,
            });
        }

        let limit = usize::from(self.table.require(tag)?);
        let mut record = StoredRecord {
            tag,
            id: None,
            len: 0,
            declared: 0,
            buf: vec![0u8; limit].into_boxed_slice(),
        };
        record.fill(id, bytes, declared);

        let evicted = if full {
            let dropped = self.records.pop_front();
            if let Some(old) = &dropped {
                warn!(
                    tag = old.tag,
                    "store full, evicting oldest record"
                );
            }
            dropped.is_some()
        } else {
            false
        };
        self.records.push_back(record);

        Ok(PutOutcome {
            index: self.records.len() - 1,
            truncated: false,
            evicted,
            overwrote: false,
        })
    }

    fn put_slot(
        &mut self,
        tag: u8,
        id: Option<u16>,
        bytes: &[u8],
        declared: usize,
    ) -> Result<PutOutcome, StoreError> {
        if let Some(index) = self.records.iter().position(|r| r.tag == tag) {
            self.records[index].fill(id, bytes, declared);
            return Ok(PutOutcome {
                index,
                truncated: false,
                evicted: false,
                overwrote: true,
            });
        }

        if self.records.len() >= self.max_records {
            return Err(StoreError::RecordLimitReached {
                max_records: self.max_records,
            });
        }

        let buf = match self.slots.get_mut(usize::from(tag)).and_then(Option::take) {
            Some(buf) => buf,
            None => vec![0u8; usize::from(self.table.require(tag)?)].into_boxed_slice(),
        };
        let mut record = StoredRecord {
            tag,
            id: None,
            len: 0,
            declared: 0,
            buf,
        };
        record.fill(id, bytes, declared);
        self.records.push_back(record);

        Ok(PutOutcome {
            index: self.records.len() - 1,
            truncated: false,
            evicted: false,
            overwrote: false,
        })
    }

    /// Drop every record. Slot buffers go back to their slots.
    pub fn clear(&mut self) {
        for record in self.records.drain(..) {
            if let Some(slot) = self.slots.get_mut(usize::from(record.tag)) {
                *slot = Some(record.buf);
            }
        }
    }

    /// Whether a `put` for `tag` would find room (ignoring payload size).
    #[must_use]
    pub fn has_room_for(&self, tag: u8) -> bool {
        if !self.table.contains(tag) {
            return false;
        }
        match self.mode {
            StorageMode::Sequential => {
                self.records.len() < self.max_records
                    || (self.when_full == StoreFullPolicy::EvictOldest && self.max_records > 0)
            }
            StorageMode::PerTagSlot => {
                self.records.len() < self.max_records || self.find(tag).is_some()
            }
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StoredRecord> {
        self.records.get(index)
    }

    /// First live record with `tag`.
    #[must_use]
    pub fn find(&self, tag: u8) -> Option<&StoredRecord> {
        self.records.iter().find(|r| r.tag == tag)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StoredRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn max_records(&self) -> usize {
        self.max_records
    }

    #[must_use]
    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    #[must_use]
    pub fn table(&self) -> &CapacityTable {
        &self.table
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("mode", &self.mode)
            .field("max_records", &self.max_records)
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtlv_types::TypeError;

    fn store(max_records: usize) -> RecordStore {
        RecordStore::new(CapacityTable::automotive(), max_records)
    }

    #[test]
    fn put_copies_payload_into_capacity_sized_buffer() {
        let mut store = store(4);
        let outcome = store.put(0x01, Some(1), &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(outcome.index, 0);
        assert!(!outcome.truncated);

        let record = store.get(0).unwrap();
        assert_eq!(record.payload(), &[1, 2, 3, 4, 5]);
        assert_eq!(record.capacity(), 64);
        assert_eq!(record.id(), Some(1));
        assert_eq!(record.record_tag(), RecordTag::CalibrationA);
    }

    #[test]
    fn unknown_tag_copies_nothing() {
        let mut store = store(4);
        let result = store.put(0x7F, None, &[1, 2, 3]);
        assert!(matches!(
            result,
            Err(StoreError::Type(TypeError::UnknownTag { tag: 0x7F }))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn payload_at_limit_is_kept_whole() {
        let mut store = store(4);
        let data = vec![0xC3; 32];
        let outcome = store.put(0x03, None, &data).unwrap();
        assert!(!outcome.truncated);
        assert_eq!(store.get(0).unwrap().payload(), data.as_slice());
    }

    #[test]
    fn payload_over_limit_is_truncated_by_default() {
        let mut store = store(4);
        let data: Vec<u8> = (0..33).collect();
        let outcome = store.put(0x03, None, &data).unwrap();
        assert!(outcome.truncated);

        let record = store.get(0).unwrap();
        assert_eq!(record.len(), 32);
        assert_eq!(record.payload(), &data[..32]);
        assert_eq!(record.declared_len(), 33);
        assert!(record.was_truncated());
    }

    #[test]
    fn payload_over_limit_rejected_under_reject_policy() {
        let mut store = store(4).with_oversize_policy(OversizePolicy::Reject);
        let result = store.put(0x40, Some(0xF001), &[0u8; 17]);
        assert!(matches!(
            result,
            Err(StoreError::OversizedPayload {
                tag: 0x40,
                declared: 17,
                max: 16
            })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn full_store_rejects_without_side_effects() {
        let mut store = store(2);
        store.put(0x10, Some(1), b"a").unwrap();
        store.put(0x10, Some(2), b"b").unwrap();

        let result = store.put(0x10, Some(3), b"c");
        assert!(matches!(
            result,
            Err(StoreError::RecordLimitReached { max_records: 2 })
        ));
        assert!(result.unwrap_err().is_capacity());
        let ids: Vec<_> = store.iter().map(StoredRecord::id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn evict_oldest_keeps_newest() {
        let mut store = store(2).with_full_policy(StoreFullPolicy::EvictOldest);
        store.put(0x10, Some(1), b"a").unwrap();
        store.put(0x10, Some(2), b"b").unwrap();
        let outcome = store.put(0x10, Some(3), b"c").unwrap();

        assert!(outcome.evicted);
        assert_eq!(outcome.index, 1);
        let ids: Vec<_> = store.iter().map(StoredRecord::id).collect();
        assert_eq!(ids, vec![Some(2), Some(3)]);
    }

    #[test]
    fn zero_capacity_store_never_accepts() {
        let mut store = store(0).with_full_policy(StoreFullPolicy::EvictOldest);
        assert!(store.put(0x10, None, b"x").is_err());
        assert!(!store.has_room_for(0x10));
        assert!(store.is_empty());
    }

    #[test]
    fn slot_mode_overwrites_in_place() {
        let mut store = store(8).with_mode(StorageMode::PerTagSlot);
        store.put(0x01, None, &[1; 10]).unwrap();
        store.put(0x02, None, &[2; 4]).unwrap();

        let outcome = store.put(0x01, None, &[9; 3]).unwrap();
        assert!(outcome.overwrote);
        assert_eq!(outcome.index, 0);
        assert_eq!(store.len(), 2);

        let slot = store.find(0x01).unwrap();
        assert_eq!(slot.payload(), &[9, 9, 9]);
        assert_eq!(slot.capacity(), 64);
    }

    #[test]
    fn slot_mode_respects_max_records_for_new_tags() {
        let mut store = store(1).with_mode(StorageMode::PerTagSlot);
        store.put(0x01, None, &[1]).unwrap();
        assert!(store.has_room_for(0x01));
        assert!(!store.has_room_for(0x02));
        assert!(matches!(
            store.put(0x02, None, &[2]),
            Err(StoreError::RecordLimitReached { max_records: 1 })
        ));
        // Same tag still overwrites.
        store.put(0x01, None, &[3]).unwrap();
        assert_eq!(store.find(0x01).unwrap().payload(), &[3]);
    }

    #[test]
    fn clear_empties_and_allows_reuse() {
        let mut store = store(2).with_mode(StorageMode::PerTagSlot);
        store.put(0x01, None, &[1, 2]).unwrap();
        store.put(0x03, None, &[3]).unwrap();
        store.clear();
        assert!(store.is_empty());

        store.put(0x03, Some(5), &[7, 7]).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().payload(), &[7, 7]);
    }
}
