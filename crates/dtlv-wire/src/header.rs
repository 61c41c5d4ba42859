use crate::error::WireError;

// All multi-byte integers on this wire are big-endian. Every field is
// composed byte by byte with `u16::from_be_bytes`, never by casting the
// input onto a struct, so alignment and struct padding never matter.

/// Size of the optional record-count prefix in front of a message.
pub const COUNT_PREFIX_SIZE: usize = 2;

/// Largest header size over all layouts. Useful for stack scratch buffers.
pub const MAX_HEADER_SIZE: usize = 5;

/// Which fixed-width header precedes every payload.
///
/// ```text
/// TagIdLength (5 bytes, default)       TagLength (3 bytes)
/// ┌─────┬─────────┬─────────┐          ┌─────┬─────────┐
/// │ tag │ id (BE) │ len (BE)│          │ tag │ len (BE)│
/// │ u8  │ u16     │ u16     │          │ u8  │ u16     │
/// └─────┴─────────┴─────────┘          └─────┴─────────┘
/// ```
///
/// The three-byte layout is what calibration update payloads use: the
/// block id is the tag itself and there is no separate record id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordLayout {
    #[default]
    TagIdLength,
    TagLength,
}

impl RecordLayout {
    /// Number of header bytes in front of each payload.
    #[must_use]
    pub const fn header_size(self) -> usize {
        match self {
            Self::TagIdLength => 5,
            Self::TagLength => 3,
        }
    }

    /// Whether the header carries a 16-bit record id.
    #[must_use]
    pub const fn has_id(self) -> bool {
        matches!(self, Self::TagIdLength)
    }
}

/// A parsed record header.
///
/// `declared_length` comes straight off the wire and is NOT trusted by
/// anything in this crate: it is only safe to use after the caller has
/// checked `payload_start + declared_length <= input.len()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag: u8,
    /// `None` for [`RecordLayout::TagLength`].
    pub id: Option<u16>,
    pub declared_length: u16,
}

impl RecordHeader {
    /// Read a header starting at `offset` of `input`.
    ///
    /// # Errors
    ///
    /// [`WireError::TruncatedHeader`] if fewer than
    /// `layout.header_size()` bytes remain at `offset`.
    pub fn read_at(input: &[u8], offset: usize, layout: RecordLayout) -> Result<Self, WireError> {
        let needed = layout.header_size();
        let bytes = offset
            .checked_add(needed)
            .and_then(|end| input.get(offset..end))
            .ok_or(WireError::TruncatedHeader {
                offset,
                needed,
                available: input.len().saturating_sub(offset),
            })?;

        let header = match layout {
            RecordLayout::TagIdLength => Self {
                tag: bytes[0],
                id: Some(u16::from_be_bytes([bytes[1], bytes[2]])),
                declared_length: u16::from_be_bytes([bytes[3], bytes[4]]),
            },
            RecordLayout::TagLength => Self {
                tag: bytes[0],
                id: None,
                declared_length: u16::from_be_bytes([bytes[1], bytes[2]]),
            },
        };
        Ok(header)
    }

    /// Write this header into the front of `buf`.
    ///
    /// A missing id is written as `0x0000` in the five-byte layout; any id
    /// is dropped in the three-byte layout.
    ///
    /// # Returns
    ///
    /// Number of bytes written (`layout.header_size()`).
    ///
    /// # Errors
    ///
    /// [`WireError::BufferTooSmall`] if `buf` cannot hold the header.
    pub fn write_to(&self, layout: RecordLayout, buf: &mut [u8]) -> Result<usize, WireError> {
        let needed = layout.header_size();
        let available = buf.len();
        let out = buf
            .get_mut(..needed)
            .ok_or(WireError::BufferTooSmall { needed, available })?;

        let len = self.declared_length.to_be_bytes();
        out[0] = self.tag;
        match layout {
            RecordLayout::TagIdLength => {
                out[1..3].copy_from_slice(&self.id.unwrap_or(0).to_be_bytes());
                out[3..5].copy_from_slice(&len);
            }
            RecordLayout::TagLength => out[1..3].copy_from_slice(&len),
        }
        Ok(needed)
    }

    /// Header bytes plus the declared payload, i.e. the full frame size.
    #[must_use]
    pub fn frame_len(&self, layout: RecordLayout) -> usize {
        layout.header_size() + usize::from(self.declared_length)
    }
}

/// Read the two-byte big-endian record count at the start of a message.
///
/// # Errors
///
/// [`WireError::TruncatedHeader`] at offset 0 if the input is shorter
/// than [`COUNT_PREFIX_SIZE`].
pub fn read_count_prefix(input: &[u8]) -> Result<u16, WireError> {
    match input {
        [hi, lo, ..] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(WireError::TruncatedHeader {
            offset: 0,
            needed: COUNT_PREFIX_SIZE,
            available: input.len(),
        }),
    }
}

/// Encode a record count as the two-byte prefix.
#[must_use]
pub fn encode_count_prefix(count: u16) -> [u8; COUNT_PREFIX_SIZE] {
    count.to_be_bytes()
}
