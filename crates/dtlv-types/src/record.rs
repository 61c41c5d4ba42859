use crate::error::TypeError;
use crate::tag::RecordTag;

/// A record located inside a caller-owned input buffer.
///
/// This is a borrowed view: `payload` is a subslice of the input that
/// produced it, so it can never reach outside `[0, L)`. The decoder
/// builds one only after checking the declared length against the
/// remaining input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedRecord<'a> {
    tag: u8,
    id: Option<u16>,
    offset: usize,
    length: u16,
    payload: &'a [u8],
}

impl<'a> DecodedRecord<'a> {
    /// Wrap a validated payload slice.
    ///
    /// `offset` is the absolute position of the record header in the
    /// input, kept for diagnostics.
    ///
    /// # Errors
    ///
    /// [`TypeError::PayloadTooLong`] if `payload` is longer than a 16-bit
    /// length field allows.
    pub fn new(
        tag: u8,
        id: Option<u16>,
        offset: usize,
        payload: &'a [u8],
    ) -> Result<Self, TypeError> {
        let length = u16::try_from(payload.len())
            .map_err(|_| TypeError::PayloadTooLong { len: payload.len() })?;
        Ok(Self {
            tag,
            id,
            offset,
            length,
            payload,
        })
    }

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

    /// Offset of the record header within the input.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn length(&self) -> u16 {
        self.length
    }

    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// The same record with its payload clipped to at most `max` bytes.
    ///
    /// Clipping only ever shortens the view; it never widens it.
    #[must_use]
    pub fn clipped(&self, max: u16) -> Self {
        let keep = self.length.min(max);
        Self {
            length: keep,
            payload: &self.payload[..usize::from(keep)],
            ..*self
        }
    }

    /// Whether the payload is longer than `max`.
    #[must_use]
    pub fn exceeds(&self, max: u16) -> bool {
        self.length > max
    }

    /// Number of whole `size`-byte elements in the payload.
    ///
    /// Trailing bytes that don't fill a complete element are not counted.
    ///
    /// # Errors
    ///
    /// [`TypeError::InvalidElementSize`] if `size` is zero.
    pub fn element_count(&self, size: usize) -> Result<usize, TypeError> {
        if size == 0 {
            return Err(TypeError::InvalidElementSize);
        }
        Ok(self.payload.len() / size)
    }

    /// Iterate the payload as fixed-size elements, e.g. per-cell battery
    /// readings packed back to back.
    ///
    /// # Errors
    ///
    /// [`TypeError::InvalidElementSize`] if `size` is zero.
    pub fn elements(&self, size: usize) -> Result<std::slice::ChunksExact<'a, u8>, TypeError> {
        if size == 0 {
            return Err(TypeError::InvalidElementSize);
        }
        Ok(self.payload.chunks_exact(size))
    }
}
