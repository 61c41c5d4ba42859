use std::fmt;

use dtlv_wire::frame::tag;

use crate::error::TypeError;
use crate::tag::RecordTag;

/// Per-tag payload limits of the default automotive table.
///
/// ```text
/// ┌──────┬────────────────┬───────────┐
/// │ Tag  │ Name           │ Max bytes │
/// ├──────┼────────────────┼───────────┤
/// │ 0x01 │ calibration_a  │ 64        │
/// │ 0x02 │ calibration_b  │ 128       │
/// │ 0x03 │ calibration_c  │ 32        │
/// │ 0x10 │ dtc_log        │ 64        │
/// │ 0x20 │ sensor_payload │ 256       │
/// │ 0x30 │ firmware_chunk │ 256       │
/// │ 0x40 │ did_data       │ 16        │
/// └──────┴────────────────┴───────────┘
/// ```
const AUTOMOTIVE: [(u8, u16); 7] = [
    (tag::CALIBRATION_A, 64),
    (tag::CALIBRATION_B, 128),
    (tag::CALIBRATION_C, 32),
    (tag::DTC_LOG, 64),
    (tag::SENSOR_PAYLOAD, 256),
    (tag::FIRMWARE_CHUNK, 256),
    (tag::DID_DATA, 16),
];

/// Static mapping from a record tag to its maximum payload size.
///
/// Backed by a 256-slot array indexed by the tag byte, so a lookup is a
/// single bounds-free index. A missing entry means "unsupported tag",
/// which every caller treats as a hard reject, never as a zero-length
/// success.
#[derive(Clone, PartialEq, Eq)]
pub struct CapacityTable {
    limits: [Option<u16>; 256],
    len: usize,
}

impl CapacityTable {
    /// A table with no entries. Every lookup returns `None`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            limits: [None; 256],
            len: 0,
        }
    }

    /// The default table for calibration, DTC, sensor, firmware and
    /// DID records.
    #[must_use]
    pub fn automotive() -> Self {
        let mut table = Self::empty();
        for (tag, max) in AUTOMOTIVE {
            table.limits[usize::from(tag)] = Some(max);
            table.len += 1;
        }
        table
    }

    #[must_use]
    pub fn builder() -> CapacityTableBuilder {
        CapacityTableBuilder {
            table: Self::empty(),
            error: None,
        }
    }

    /// Maximum payload size for `tag`, or `None` if the tag is unknown.
    #[must_use]
    pub fn lookup(&self, tag: u8) -> Option<u16> {
        self.limits[usize::from(tag)]
    }

    /// Like [`lookup`](Self::lookup), but unknown tags become an error.
    ///
    /// # Errors
    ///
    /// [`TypeError::UnknownTag`] if `tag` has no entry.
    pub fn require(&self, tag: u8) -> Result<u16, TypeError> {
        self.lookup(tag).ok_or(TypeError::UnknownTag { tag })
    }

    #[must_use]
    pub fn contains(&self, tag: u8) -> bool {
        self.lookup(tag).is_some()
    }

    /// Registered `(tag, max)` pairs in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u16)> + '_ {
        (0..=u8::MAX).filter_map(|tag| self.lookup(tag).map(|max| (tag, max)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for CapacityTable {
    fn default() -> Self {
        Self::automotive()
    }
}

impl fmt::Debug for CapacityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(tag, max)| (RecordTag::from_wire_id(tag), max)))
            .finish()
    }
}

/// Builder for custom capacity tables.
///
/// Errors are latched: the first bad registration is reported by
/// [`build`](Self::build) and later calls are ignored.
pub struct CapacityTableBuilder {
    table: CapacityTable,
    error: Option<TypeError>,
}

impl CapacityTableBuilder {
    #[must_use]
    pub fn with(mut self, tag: u8, max: u16) -> Self {
        if self.error.is_some() {
            return self;
        }
        let slot = &mut self.table.limits[usize::from(tag)];
        if max == 0 {
            self.error = Some(TypeError::ZeroCapacity { tag });
        } else if slot.is_some() {
            self.error = Some(TypeError::DuplicateTag { tag });
        } else {
            *slot = Some(max);
            self.table.len += 1;
        }
        self
    }

    #[must_use]
    pub fn with_tag(self, tag: RecordTag, max: u16) -> Self {
        self.with(tag.wire_id(), max)
    }

    /// # Errors
    ///
    /// [`TypeError::DuplicateTag`] or [`TypeError::ZeroCapacity`] for the
    /// first invalid registration.
    pub fn build(self) -> Result<CapacityTable, TypeError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.table),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn automotive_table_matches_constants() {
        let table = CapacityTable::automotive();
        assert_eq!(table.lookup(0x01), Some(64));
        assert_eq!(table.lookup(0x02), Some(128));
        assert_eq!(table.lookup(0x03), Some(32));
        assert_eq!(table.lookup(0x10), Some(64));
        assert_eq!(table.lookup(0x20), Some(256));
        assert_eq!(table.lookup(0x30), Some(256));
        assert_eq!(table.lookup(0x40), Some(16));
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn unknown_tag_is_absent_not_zero() {
        let table = CapacityTable::automotive();
        assert_eq!(table.lookup(0x7F), None);
        assert!(matches!(
            table.require(0x7F),
            Err(TypeError::UnknownTag { tag: 0x7F })
        ));
    }

    #[test]
    fn every_known_tag_has_a_limit() {
        let table = CapacityTable::automotive();
        for tag in RecordTag::KNOWN {
            assert!(table.contains(tag.wire_id()), "missing limit for {tag:?}");
        }
    }

    #[test]
    fn builder_rejects_duplicates_and_zero() {
        let dup = CapacityTable::builder().with(0x01, 8).with(0x01, 16).build();
        assert!(matches!(dup, Err(TypeError::DuplicateTag { tag: 0x01 })));

        let zero = CapacityTable::builder().with(0x05, 0).build();
        assert!(matches!(zero, Err(TypeError::ZeroCapacity { tag: 0x05 })));
    }

    #[test]
    fn builder_latches_first_error() {
        let result = CapacityTable::builder()
            .with(0x09, 0)
            .with(0x01, 4)
            .with(0x01, 4)
            .build();
        assert!(matches!(result, Err(TypeError::ZeroCapacity { tag: 0x09 })));
    }

    #[test]
    fn iter_is_tag_ordered() {
        let table = CapacityTable::builder()
            .with(0xF0, 1)
            .with_tag(RecordTag::DidData, 16)
            .with(0x00, 2)
            .build()
            .unwrap();
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries, vec![(0x00, 2), (0x40, 16), (0xF0, 1)]);
        assert!(!table.is_empty());
        assert!(CapacityTable::empty().is_empty());
    }
}
