use crate::error::WireError;
use crate::header::{MAX_HEADER_SIZE, RecordHeader, RecordLayout};

/// Known record tag bytes.
///
/// These are the tags the default capacity table knows about. The
/// `dtlv-types` crate names them as an enum; the raw bytes live here so
/// writers don't need the higher-level crate.
pub mod tag {
    pub const CALIBRATION_A: u8 = 0x01;
    pub const CALIBRATION_B: u8 = 0x02;
    pub const CALIBRATION_C: u8 = 0x03;
    pub const DTC_LOG: u8 = 0x10;
    pub const SENSOR_PAYLOAD: u8 = 0x20;
    pub const FIRMWARE_CHUNK: u8 = 0x30;
    pub const DID_DATA: u8 = 0x40;
}

/// One record on the wire, with an owned payload.
///
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │ tag          (u8)                            │
/// │ id           (u16 BE, TagIdLength only)      │
/// │ length       (u16 BE)                        │
/// │ payload      [length bytes]                  │
/// └──────────────────────────────────────────────┘
/// ```
///
/// The decoder never builds these (it hands out borrowed views instead);
/// frames are the writer-side representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordFrame {
    pub tag: u8,
    pub id: Option<u16>,
    pub payload: Vec<u8>,
}

impl RecordFrame {
    /// Build the header this frame would be written with.
    ///
    /// # Errors
    ///
    /// [`WireError::LengthOverflow`] if the payload is longer than
    /// `u16::MAX` bytes.
    pub fn header(&self) -> Result<RecordHeader, WireError> {
        let declared_length = u16::try_from(self.payload.len()).map_err(|_| {
            WireError::LengthOverflow {
                len: self.payload.len(),
            }
        })?;
        Ok(RecordHeader {
            tag: self.tag,
            id: self.id,
            declared_length,
        })
    }

    /// Write this frame to the provided writer.
    ///
    /// # Returns
    ///
    /// Total number of bytes written.
    ///
    /// # Errors
    ///
    /// [`WireError::LengthOverflow`] for oversized payloads, or any I/O
    /// error from the writer.
    pub fn write_to(
        &self,
        layout: RecordLayout,
        w: &mut impl std::io::Write,
    ) -> Result<usize, WireError> {
        let header = self.header()?;
        let mut scratch = [0u8; MAX_HEADER_SIZE];
        let n = header.write_to(layout, &mut scratch)?;

        w.write_all(&scratch[..n])?;
        w.write_all(&self.payload)?;

        Ok(n + self.payload.len())
    }

    /// Read one frame from the front of `buf`, copying its payload.
    ///
    /// # Returns
    ///
    /// `(frame, bytes_consumed)`.
    ///
    /// # Errors
    ///
    /// - [`WireError::TruncatedHeader`] if the header doesn't fit.
    /// - [`WireError::TruncatedPayload`] if the declared length runs past
    ///   the end of `buf`. Nothing is copied in that case.
    pub fn read_from(buf: &[u8], layout: RecordLayout) -> Result<(Self, usize), WireError> {
        let header = RecordHeader::read_at(buf, 0, layout)?;
        let start = layout.header_size();
        let end = header.frame_len(layout);

        let payload = buf.get(start..end).ok_or(WireError::TruncatedPayload {
            offset: start,
            declared: header.declared_length,
            available: buf.len().saturating_sub(start),
        })?;

        Ok((
            Self {
                tag: header.tag,
                id: header.id,
                payload: payload.to_vec(),
            },
            end,
        ))
    }
}
