/// Implementation of `dtlv inspect`.
///
/// Decodes a message with the given policies and prints the report,
/// then one line per stored record. `--show-payload` adds a hex dump of
/// each stored payload.
///
/// # Output format
///
/// ```text
/// termination: complete
/// accepted: 2
/// ...
/// ---
/// Record 0: dtc_log [0x10] id=7 (3 bytes, capacity 64)
/// Record 1: did_data [0x40] id=0xF001 (16 of 20 bytes, capacity 16)
/// ---
/// journal: 33 bytes
/// ```
use anyhow::Result;
use dtlv_decoder::{DecodePipeline, RawInput, StoredRecord};

use crate::InspectArgs;
use crate::input::{dump, read_message};

/// Run the `dtlv inspect` command.
///
/// A message that decodes with rejections or a non-complete termination
/// is still inspected successfully; only I/O and hex errors fail.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid hex.
pub fn run(args: &InspectArgs) -> Result<()> {
    let bytes = read_message(&args.file, args.hex)?;
    let mut pipeline = DecodePipeline::with_config(args.policy.to_config());
    let report = pipeline.decode(RawInput::from(&bytes));

    println!("{report}");
    println!("---");
    for (idx, record) in pipeline.store().iter().enumerate() {
        println!("Record {idx}: {}", record_line(record));
        if args.show_payload {
            dump(record.payload(), "          ");
        }
    }

    if let Some(journal) = pipeline.journal() {
        println!("---");
        println!("journal: {} bytes", journal.len());
    }
    Ok(())
}

fn record_line(record: &StoredRecord) -> String {
    let tag = record.record_tag();
    let id = match record.id() {
        Some(id) if id > 0xFF => format!(" id={id:#06X}"),
        Some(id) => format!(" id={id}"),
        None => String::new(),
    };
    let size = if record.was_truncated() {
        format!("{} of {} bytes", record.len(), record.declared_len())
    } else {
        format!("{} bytes", record.len())
    };
    format!(
        "{} [{:#04X}]{id} ({size}, capacity {})",
        tag.name(),
        record.tag(),
        record.capacity()
    )
}
