use std::iter::FusedIterator;

use dtlv_types::DecodedRecord;
use dtlv_wire::header::{COUNT_PREFIX_SIZE, RecordHeader, RecordLayout, read_count_prefix};
use dtlv_wire::WireError;
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::input::RawInput;

/// Where a [`RecordDecoder`] is in its scan.
///
/// ```text
///              header fits                 payload fits
///   Scanning ───────────────▶ HeaderParsed ─────────────▶ Scanning
///      │                           │
///      │ offset == L               │ offset + length > L
///      │ or count reached          ▼
///      ▼                       Malformed   (fused)
///    Done   (fused)
///
///   Scanning ── fewer than header_size bytes left ──▶ Malformed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    Scanning,
    HeaderParsed,
    Done,
    Malformed,
}

impl DecoderState {
    /// `Done` or `Malformed`: the decoder will yield nothing more.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Malformed)
    }
}

/// Lazy, single-pass record scanner over an untrusted input.
///
/// Yields one borrowed [`DecodedRecord`] per well-framed record. A record
/// is only yielded after its declared length has been checked against the
/// bytes that remain, so every payload view lies inside the input. The
/// first framing error is yielded once as `Err` and the decoder stops.
///
/// The decoder knows nothing about capacities or tags; it only frames.
/// Deciding what to keep is the job of [`DecodePipeline`](crate::DecodePipeline).
///
/// # Example
///
/// ```rust
/// use dtlv_decoder::{RawInput, RecordDecoder, RecordLayout};
///
/// let input = [0x01u8, 0x00, 0x01, 0x00, 0x02, 0xAA, 0xBB];
/// let mut decoder = RecordDecoder::new(RawInput::from(&input), RecordLayout::TagIdLength);
///
/// let record = decoder.next().unwrap().unwrap();
/// assert_eq!(record.payload(), &[0xAA, 0xBB]);
/// assert!(decoder.next().is_none());
/// ```
pub struct RecordDecoder<'a> {
    input: &'a [u8],
    layout: RecordLayout,
    offset: usize,
    state: DecoderState,
    declared_count: Option<u16>,
    records_read: usize,
}

impl<'a> RecordDecoder<'a> {
    /// Scan records from the start of `input`, with no count prefix.
    #[must_use]
    pub fn new(input: RawInput<'a>, layout: RecordLayout) -> Self {
        Self {
            input: input.as_bytes(),
            layout,
            offset: 0,
            state: DecoderState::Scanning,
            declared_count: None,
            records_read: 0,
        }
    }

    /// Read a two-byte record count, then scan at most that many records.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Wire`] with `TruncatedHeader` at offset 0 if the
    /// input is shorter than the prefix.
    pub fn with_count_prefix(input: RawInput<'a>, layout: RecordLayout) -> Result<Self, DecodeError> {
        let count = read_count_prefix(input.as_bytes())?;
        debug!(count, "record count prefix");
        Ok(Self {
            input: input.as_bytes(),
            layout,
            offset: COUNT_PREFIX_SIZE,
            state: DecoderState::Scanning,
            declared_count: Some(count),
            records_read: 0,
        })
    }

    #[must_use]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Bytes consumed so far, prefix included.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// The count prefix, if the decoder was built with one.
    #[must_use]
    pub fn declared_count(&self) -> Option<u16> {
        self.declared_count
    }

    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Input bytes not consumed by any yielded record.
    ///
    /// Non-empty after `Done` only when a count prefix stopped the scan
    /// early; after `Malformed` it starts at the offending header.
    #[must_use]
    pub fn trailing(&self) -> &'a [u8] {
        &self.input[self.offset..]
    }

    fn count_reached(&self) -> bool {
        self.declared_count
            .is_some_and(|count| self.records_read >= usize::from(count))
    }

    fn finish(&mut self) {
        self.state = DecoderState::Done;
        let trailing = self.input.len() - self.offset;
        if trailing > 0 {
            debug!(trailing, "count reached with bytes left over");
        }
        match self.declared_count {
            Some(count) if self.records_read < usize::from(count) => warn!(
                declared = count,
                read = self.records_read,
                "input ended before declared record count"
            ),
            _ => {}
        }
    }

    fn fail(&mut self, error: impl Into<DecodeError>) -> DecodeError {
        let error = error.into();
        warn!(offset = self.offset, %error, "malformed record, stopping");
        self.state = DecoderState::Malformed;
        error
    }

    fn step(&mut self) -> Option<Result<DecodedRecord<'a>, DecodeError>> {
        if self.count_reached() || self.offset == self.input.len() {
            self.finish();
            return None;
        }

        let header = match RecordHeader::read_at(self.input, self.offset, self.layout) {
            Ok(header) => header,
            Err(e) => return Some(Err(self.fail(e))),
        };
        self.state = DecoderState::HeaderParsed;

        let start = self.offset + self.layout.header_size();
        let payload = start
            .checked_add(usize::from(header.declared_length))
            .and_then(|end| self.input.get(start..end));
        let Some(payload) = payload else {
            let available = self.input.len() - start;
            return Some(Err(self.fail(WireError::TruncatedPayload {
                offset: start,
                declared: header.declared_length,
                available,
            })));
        };

        let record = match DecodedRecord::new(header.tag, header.id, self.offset, payload) {
            Ok(record) => record,
            Err(e) => return Some(Err(self.fail(e))),
        };
        self.offset = start + payload.len();
        self.records_read += 1;
        self.state = DecoderState::Scanning;
        Some(Ok(record))
    }
}

impl<'a> Iterator for RecordDecoder<'a> {
    type Item = Result<DecodedRecord<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }
        self.step()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state.is_terminal() {
            return (0, Some(0));
        }
        // Every record consumes at least a header; a truncated tail may
        // still produce one error item.
        let by_bytes = (self.input.len() - self.offset).div_ceil(self.layout.header_size());
        let upper = match self.declared_count {
            Some(count) => by_bytes.min(usize::from(count).saturating_sub(self.records_read)),
            None => by_bytes,
        };
        (0, Some(upper))
    }
}

impl FusedIterator for RecordDecoder<'_> {}
