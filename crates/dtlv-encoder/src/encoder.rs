use dtlv_types::RecordTag;
use dtlv_wire::frame::{RecordFrame, tag};
use dtlv_wire::header::{COUNT_PREFIX_SIZE, RecordLayout, encode_count_prefix};

use crate::error::EncodeError;

/// Largest payload a single record can declare.
const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Record encoder: builds a wire message from typed records.
///
/// This is the producer side of the format, used by test fixtures, the
/// `dtlv encode` command and anything that needs to emit well-formed
/// diagnostic messages. Methods like [`add_dtc`](Self::add_dtc) and
/// [`add_firmware_chunk`](Self::add_firmware_chunk) append records to an
/// internal list and return `&mut Self` for chaining; nothing is
/// validated or written until [`encode`](Self::encode).
///
/// The encoder does not apply a capacity table. It writes exactly what
/// it is given, which is how oversized and malformed fixtures are made.
///
/// # Usage
///
/// ```rust
/// use dtlv_encoder::RecordEncoder;
///
/// let message = RecordEncoder::new()
///     .with_count_prefix()
///     .add_dtc(7, &[0xAA, 0xBB, 0xCC])
///     .add_did_data(0xF001, &[0x01, 0x02])
///     .encode()
///     .unwrap();
///
/// assert_eq!(&message[..2], &[0x00, 0x02]);
/// ```
///
/// # Output layout
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────┐
/// │ [2 bytes]    │ Record count, BE (only with_count_prefix)│
/// │ [3|5 bytes]  │ Record 0 header (tag, [id], length)      │
/// │ [N bytes]    │ Record 0 payload                         │
/// │ ...          │ Record 1 ...                             │
/// └──────────────┴──────────────────────────────────────────┘
/// ```
///
/// There is no terminator: a message ends where its input ends, or
/// after `count` records when the prefix is present.
#[derive(Clone, Debug, Default)]
pub struct RecordEncoder {
    records: Vec<RecordFrame>,
    layout: RecordLayout,
    count_prefix: bool,
}

impl RecordEncoder {
    /// Create an empty encoder for the five-byte layout with no prefix.
    ///
    /// Encoding an empty encoder is valid and produces an empty message
    /// (or just `00 00` with a count prefix).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the header layout for every record.
    pub fn with_layout(&mut self, layout: RecordLayout) -> &mut Self {
        self.layout = layout;
        self
    }

    /// Emit a two-byte record count in front of the records.
    pub fn with_count_prefix(&mut self) -> &mut Self {
        self.count_prefix = true;
        self
    }

    // ── Record addition methods ─────────────────────────────────────────

    /// Add a record with an arbitrary tag byte.
    ///
    /// Unknown tags are allowed; a decoder decides what to do with them.
    pub fn add_record(&mut self, tag: u8, id: u16, payload: &[u8]) -> &mut Self {
        self.push(tag, Some(id), payload)
    }

    /// Add a record without an id.
    ///
    /// Required for [`RecordLayout::TagLength`]. In the five-byte layout
    /// the id field is written as zero.
    pub fn add_record_without_id(&mut self, tag: u8, payload: &[u8]) -> &mut Self {
        self.push(tag, None, payload)
    }

    /// Add a calibration block update.
    ///
    /// `block` should be one of the calibration tags; any other tag is
    /// written as given.
    pub fn add_calibration(&mut self, block: RecordTag, payload: &[u8]) -> &mut Self {
        self.push(block.wire_id(), None, payload)
    }

    /// Add a diagnostic trouble code log entry.
    pub fn add_dtc(&mut self, id: u16, payload: &[u8]) -> &mut Self {
        self.push(tag::DTC_LOG, Some(id), payload)
    }

    /// Add an ADAS sensor packet payload.
    pub fn add_sensor_payload(&mut self, sensor_id: u16, payload: &[u8]) -> &mut Self {
        self.push(tag::SENSOR_PAYLOAD, Some(sensor_id), payload)
    }

    /// Add one firmware update chunk. The id carries the chunk sequence.
    pub fn add_firmware_chunk(&mut self, sequence: u16, payload: &[u8]) -> &mut Self {
        self.push(tag::FIRMWARE_CHUNK, Some(sequence), payload)
    }

    /// Add a ReadDataByIdentifier response body.
    pub fn add_did_data(&mut self, did: u16, payload: &[u8]) -> &mut Self {
        self.push(tag::DID_DATA, Some(did), payload)
    }

    fn push(&mut self, tag: u8, id: Option<u16>, payload: &[u8]) -> &mut Self {
        self.records.push(RecordFrame {
            tag,
            id,
            payload: payload.to_vec(),
        });
        self
    }

    // ── Inspection ──────────────────────────────────────────────────────

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Exact size of the message [`encode`](Self::encode) would produce.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let prefix = if self.count_prefix { COUNT_PREFIX_SIZE } else { 0 };
        self.records.iter().fold(prefix, |acc, r| {
            acc + self.layout.header_size() + r.payload.len()
        })
    }

    // ── Serialization ───────────────────────────────────────────────────

    /// Serialize all records into one message.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::TooManyRecords`] if a count prefix is requested
    ///   for more than `u16::MAX` records.
    /// - [`EncodeError::PayloadTooLarge`] for a payload over `u16::MAX`
    ///   bytes.
    /// - [`EncodeError::IdNotRepresentable`] if a record carries an id
    ///   and the layout is [`RecordLayout::TagLength`].
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;

        let mut output = Vec::with_capacity(self.encoded_len());
        if self.count_prefix {
            let count = u16::try_from(self.records.len()).map_err(|_| {
                EncodeError::TooManyRecords {
                    count: self.records.len(),
                }
            })?;
            output.extend_from_slice(&encode_count_prefix(count));
        }
        for record in &self.records {
            record.write_to(self.layout, &mut output)?;
        }

        debug_assert_eq!(output.len(), self.encoded_len());
        Ok(output)
    }

    fn validate(&self) -> Result<(), EncodeError> {
        if self.count_prefix && self.records.len() > usize::from(u16::MAX) {
            return Err(EncodeError::TooManyRecords {
                count: self.records.len(),
            });
        }
        for (index, record) in self.records.iter().enumerate() {
            if record.payload.len() > MAX_PAYLOAD_SIZE {
                return Err(EncodeError::PayloadTooLarge {
                    tag: record.tag,
                    len: record.payload.len(),
                    limit: MAX_PAYLOAD_SIZE,
                });
            }
            if record.id.is_some() && !self.layout.has_id() {
                return Err(EncodeError::IdNotRepresentable {
                    index,
                    tag: record.tag,
                });
            }
        }
        Ok(())
    }
}
