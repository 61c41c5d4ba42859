use std::fmt;

use dtlv_store::{
    BoundedBuffer, OversizePolicy, PutOutcome, RecordStore, StoreError, StoredRecord,
};
use dtlv_types::{CapacityTable, DecodedRecord, TypeError};
use dtlv_wire::header::{
    COUNT_PREFIX_SIZE, MAX_HEADER_SIZE, RecordHeader, RecordLayout, encode_count_prefix,
};
use tracing::{debug, info, warn};

use crate::config::{DecodeConfig, TruncatedInputPolicy, UnknownTagPolicy};
use crate::decoder::RecordDecoder;
use crate::error::DecodeError;
use crate::input::RawInput;
use crate::sink::RecordSink;

/// Why a decode call stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Termination {
    /// Every record in the input was framed and handled.
    #[default]
    Complete,
    /// A header or payload ran past the end of the input.
    TruncatedInput,
    /// The store or the journal had no room for the next record.
    CapacityFull,
    /// An unknown tag was met under [`UnknownTagPolicy::RejectAll`].
    UnknownTag,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Complete => "complete",
            Self::TruncatedInput => "truncated_input",
            Self::CapacityFull => "capacity_full",
            Self::UnknownTag => "unknown_tag",
        })
    }
}

/// Outcome of one [`DecodePipeline::decode`] call.
///
/// Counts refer to this call only. `rejected` counts every fully framed
/// record that was not stored, for whatever reason; `skipped_unknown` and
/// the oversize rejections are subsets of it.
#[derive(Debug, Default)]
pub struct DecodeReport {
    pub termination: Termination,
    pub accepted: usize,
    pub rejected: usize,
    pub skipped_unknown: usize,
    /// Accepted records whose payload was clipped to the tag's capacity.
    pub truncated: usize,
    /// Older records dropped to make room (sequential store, `EvictOldest`).
    pub evicted: usize,
    /// Input bytes framed by the decoder, count prefix included.
    pub bytes_consumed: usize,
    pub trailing_bytes: usize,
    pub declared_count: Option<u16>,
    /// The error behind a non-`Complete` termination.
    pub failure: Option<DecodeError>,
    /// An earlier failure replaced by `failure`, e.g. the truncated tail
    /// of an input whose kept records then filled the store.
    pub superseded: Option<DecodeError>,
}

impl DecodeReport {
    /// Complete, with nothing rejected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.termination == Termination::Complete && self.rejected == 0
    }

    fn stop(&mut self, termination: Termination, error: impl Into<DecodeError>) {
        let error = error.into();
        if let Some(previous) = self.failure.take() {
            warn!(
                %previous,
                was = %self.termination,
                now = %termination,
                "earlier failure superseded"
            );
            self.superseded = Some(previous);
        }
        self.termination = termination;
        self.failure = Some(error);
    }
}

impl fmt::Display for DecodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "termination: {}", self.termination)?;
        write!(f, "\naccepted: {}", self.accepted)?;
        write!(f, "\nrejected: {}", self.rejected)?;
        write!(f, "\nskipped_unknown: {}", self.skipped_unknown)?;
        write!(f, "\ntruncated: {}", self.truncated)?;
        write!(f, "\nevicted: {}", self.evicted)?;
        write!(f, "\nbytes_consumed: {}", self.bytes_consumed)?;
        write!(f, "\ntrailing_bytes: {}", self.trailing_bytes)?;
        match self.declared_count {
            Some(count) => write!(f, "\ndeclared_count: {count}")?,
            None => write!(f, "\ndeclared_count: -")?,
        }
        if let Some(failure) = &self.failure {
            write!(f, "\nfailure: {failure}")?;
        }
        if let Some(superseded) = &self.superseded {
            write!(f, "\nsuperseded: {superseded}")?;
        }
        Ok(())
    }
}

/// An encoded journal header, built before the store is touched.
struct JournalEntry {
    header: [u8; MAX_HEADER_SIZE],
    header_len: usize,
}

/// Re-encoded copy of every committed record, as one count-prefixed
/// message that the decoder can read back.
struct Journal {
    buf: BoundedBuffer,
    records: u16,
}

impl Journal {
    fn new(capacity: usize) -> Self {
        Self {
            buf: BoundedBuffer::new(capacity),
            records: 0,
        }
    }

    fn frame_size(&self, layout: RecordLayout, payload_len: u16) -> usize {
        let prefix = if self.buf.is_empty() { COUNT_PREFIX_SIZE } else { 0 };
        prefix + layout.header_size() + usize::from(payload_len)
    }

    /// Check that `record` would fit and encode its header, without
    /// writing anything. `record` must already be clipped to capacity.
    fn prepare(
        &self,
        layout: RecordLayout,
        record: &DecodedRecord<'_>,
    ) -> Result<JournalEntry, DecodeError> {
        if self.records == u16::MAX {
            return Err(StoreError::RecordLimitReached {
                max_records: usize::from(u16::MAX),
            }
            .into());
        }
        let needed = self.frame_size(layout, record.length());
        if !self.buf.fits(needed) {
            return Err(StoreError::CapacityExceeded {
                capacity: self.buf.capacity(),
                cursor: self.buf.len(),
                requested: needed,
            }
            .into());
        }

        let header = RecordHeader {
            tag: record.tag(),
            id: record.id(),
            declared_length: record.length(),
        };
        let mut entry = JournalEntry {
            header: [0u8; MAX_HEADER_SIZE],
            header_len: 0,
        };
        entry.header_len = header.write_to(layout, &mut entry.header)?;
        Ok(entry)
    }

    /// Write a prepared entry. Room was checked by [`prepare`](Self::prepare).
    fn append(&mut self, entry: &JournalEntry, payload: &[u8]) -> Result<(), StoreError> {
        let header = &entry.header[..entry.header_len];
        if self.buf.is_empty() {
            let prefix = encode_count_prefix(0);
            self.buf.append_parts(&[&prefix[..], header, payload])?;
        } else {
            self.buf.append_parts(&[header, payload])?;
        }
        self.records += 1;
        self.buf.patch(0, &encode_count_prefix(self.records))
    }

    fn reset(&mut self) {
        self.buf.reset();
        self.records = 0;
    }
}

/// Decode-and-bound engine: frames untrusted input, checks every record
/// against the capacity table and copies the survivors into a
/// [`RecordStore`].
///
/// Each call runs in two passes:
///
///   1. **Validate.** Walk the input with a [`RecordDecoder`], look up each
///      tag, apply the unknown-tag and oversize policies, and collect
///      borrowed views. Nothing is copied.
///   2. **Commit.** Unless the whole message was rejected, copy the
///      staged records into the store in input order, append each to the
///      journal (if configured), and hand it to the sink.
///
/// ```text
/// &[u8] ──▶ RecordDecoder ──▶ CapacityTable ──▶ staged views
///                                                   │
///                          RecordStore ◀── commit ──┤
///                          Journal     ◀────────────┤
///                          RecordSink  ◀────────────┘
/// ```
///
/// The pipeline owns its store and journal. They outlive a single call:
/// records accumulate until [`clear`](Self::clear).
pub struct DecodePipeline {
    config: DecodeConfig,
    store: RecordStore,
    journal: Option<Journal>,
}

impl DecodePipeline {
    #[must_use]
    pub fn new(table: CapacityTable, config: DecodeConfig) -> Self {
        let store = RecordStore::new(table, config.max_records)
            .with_mode(config.storage)
            .with_oversize_policy(config.on_oversized_payload)
            .with_full_policy(config.on_store_full);
        let journal = config.journal_capacity.map(Journal::new);
        Self {
            config,
            store,
            journal,
        }
    }

    /// A pipeline over the automotive capacity table.
    #[must_use]
    pub fn with_config(config: DecodeConfig) -> Self {
        Self::new(CapacityTable::automotive(), config)
    }

    #[must_use]
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// The journal's bytes so far, if a journal is configured.
    #[must_use]
    pub fn journal(&self) -> Option<&[u8]> {
        self.journal.as_ref().map(|j| j.buf.snapshot())
    }

    /// Empty the store and the journal.
    pub fn clear(&mut self) {
        self.store.clear();
        if let Some(journal) = &mut self.journal {
            journal.reset();
        }
    }

    /// Decode `input` into the store.
    ///
    /// Never fails: malformed input, unknown tags and a full store all
    /// end the call with a report that says so. Records stored by earlier
    /// calls are never touched by a failing one.
    pub fn decode(&mut self, input: RawInput<'_>) -> DecodeReport {
        self.run(input, &mut |_: &StoredRecord| {})
    }

    /// Decode the first `declared_len` bytes of `bytes`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::DeclaredLengthExceedsBuffer`] if `declared_len`
    /// is larger than the buffer. The store is untouched.
    pub fn decode_declared(
        &mut self,
        bytes: &[u8],
        declared_len: usize,
    ) -> Result<DecodeReport, DecodeError> {
        let input = RawInput::new(bytes, declared_len)?;
        Ok(self.decode(input))
    }

    /// Like [`decode`](Self::decode), handing every committed record to
    /// `sink` as it is stored.
    pub fn decode_with_sink(
        &mut self,
        input: RawInput<'_>,
        sink: &mut impl RecordSink,
    ) -> DecodeReport {
        self.run(input, sink)
    }

    fn run(&mut self, input: RawInput<'_>, sink: &mut dyn RecordSink) -> DecodeReport {
        let mut report = DecodeReport::default();
        let staged = self.validate(input, &mut report);
        self.commit(&staged, &mut report, sink);

        info!(
            termination = %report.termination,
            accepted = report.accepted,
            rejected = report.rejected,
            bytes = report.bytes_consumed,
            "decode finished"
        );
        report
    }

    /// First pass: frame and check, collecting views.
    fn validate<'a>(
        &self,
        input: RawInput<'a>,
        report: &mut DecodeReport,
    ) -> Vec<DecodedRecord<'a>> {
        let layout = self.config.layout;
        let mut decoder = if self.config.count_prefix {
            match RecordDecoder::with_count_prefix(input, layout) {
                Ok(decoder) => decoder,
                Err(e) => {
                    warn!(%e, "count prefix unreadable");
                    report.trailing_bytes = input.len();
                    report.stop(Termination::TruncatedInput, e);
                    return Vec::new();
                }
            }
        } else {
            RecordDecoder::new(input, layout)
        };
        report.declared_count = decoder.declared_count();

        let table = self.store.table();
        let mut staged = Vec::new();
        for item in decoder.by_ref() {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    report.stop(Termination::TruncatedInput, e);
                    break;
                }
            };

            let Some(max) = table.lookup(record.tag()) else {
                if self.config.on_unknown_tag == UnknownTagPolicy::RejectAll {
                    warn!(
                        tag = record.tag(),
                        offset = record.offset(),
                        "unknown tag, rejecting message"
                    );
                    report.rejected += 1;
                    let error = TypeError::UnknownTag { tag: record.tag() };
                    report.stop(Termination::UnknownTag, error);
                    break;
                }
                warn!(
                    tag = record.tag(),
                    offset = record.offset(),
                    length = record.length(),
                    "skipping record with unknown tag"
                );
                report.skipped_unknown += 1;
                report.rejected += 1;
                continue;
            };

            if record.exceeds(max) && self.config.on_oversized_payload == OversizePolicy::Reject {
                warn!(
                    tag = record.tag(),
                    declared = record.length(),
                    max,
                    "rejecting oversized payload"
                );
                report.rejected += 1;
                continue;
            }
            staged.push(record);
        }

        report.bytes_consumed = decoder.offset();
        report.trailing_bytes = decoder.trailing().len();
        staged
    }

    /// Second pass: copy staged views into owned storage.
    fn commit(
        &mut self,
        staged: &[DecodedRecord<'_>],
        report: &mut DecodeReport,
        sink: &mut dyn RecordSink,
    ) {
        let reject_message = match report.termination {
            Termination::UnknownTag => true,
            Termination::TruncatedInput => {
                self.config.on_truncated_input == TruncatedInputPolicy::RejectAll
            }
            Termination::Complete | Termination::CapacityFull => false,
        };
        if reject_message {
            warn!(records = staged.len(), termination = %report.termination, "rejecting whole message");
            report.rejected += staged.len();
            return;
        }

        for (i, record) in staged.iter().enumerate() {
            match self.commit_one(record) {
                Ok(outcome) => {
                    report.accepted += 1;
                    report.truncated += usize::from(outcome.truncated);
                    report.evicted += usize::from(outcome.evicted);
                    if let Some(stored) = self.store.get(outcome.index) {
                        sink.accept(stored);
                    }
                }
                Err(e) if e.is_capacity() => {
                    warn!(%e, remaining = staged.len() - i, "out of room, stopping");
                    report.rejected += staged.len() - i;
                    report.stop(Termination::CapacityFull, e);
                    return;
                }
                Err(e) => {
                    warn!(%e, tag = record.tag(), "record not stored");
                    report.rejected += 1;
                }
            }
        }
    }

    /// Store one record and journal it. Every fallible journal step runs
    /// before the store is touched.
    fn commit_one(&mut self, record: &DecodedRecord<'_>) -> Result<PutOutcome, DecodeError> {
        let layout = self.config.layout;
        let max = self.store.table().require(record.tag())?;
        let kept = record.clipped(max);
        let entry = match &self.journal {
            Some(journal) => Some(journal.prepare(layout, &kept)?),
            None => None,
        };

        let outcome = self
            .store
            .put(record.tag(), record.id(), record.payload())?;
        debug!(
            tag = record.tag(),
            id = record.id(),
            length = kept.length(),
            "record accepted"
        );

        if let (Some(journal), Some(entry)) = (&mut self.journal, entry) {
            journal.append(&entry, kept.payload())?;
        }
        Ok(outcome)
    }
}

impl Default for DecodePipeline {
    /// The automotive table with [`DecodeConfig::default`].
    fn default() -> Self {
        Self::with_config(DecodeConfig::default())
    }
}

impl fmt::Debug for DecodePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodePipeline")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("journal_len", &self.journal().map(<[u8]>::len))
            .finish()
    }
}
