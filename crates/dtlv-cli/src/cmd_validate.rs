/// Implementation of `dtlv validate`.
///
/// Decodes the message and reports either a series of success checkmarks
/// (`✓`) or a diagnostic failure line (`✗`). Exits 0 only when the report
/// is `Complete` and nothing was rejected.
///
/// # Success output
///
/// ```text
/// ✓ Framing: 3 records, 27 bytes, no trailing data
/// ✓ Tags: all known
/// ✓ Capacity: 3 stored, 0 truncated
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: truncated_input: truncated payload at offset 5: declared 300 bytes, 10 available
/// ```
use anyhow::{Result, anyhow};
use dtlv_decoder::{DecodePipeline, DecodeReport, RawInput, Termination};

use crate::ValidateArgs;
use crate::input::read_message;

/// Run the `dtlv validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if the message does
/// not decode cleanly.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let bytes = read_message(&args.file, args.hex)?;
    let mut pipeline = DecodePipeline::with_config(args.policy.to_config());
    let report = pipeline.decode(RawInput::from(&bytes));

    if report.is_clean() {
        println!(
            "✓ Framing: {} record{}, {} bytes, {}",
            report.accepted,
            if report.accepted == 1 { "" } else { "s" },
            report.bytes_consumed,
            trailing_note(&report)
        );
        println!("✓ Tags: all known");
        println!(
            "✓ Capacity: {} stored, {} truncated",
            pipeline.store().len(),
            report.truncated
        );
        return Ok(());
    }

    println!("✗ Error: {}", diagnostic(&report));
    Err(anyhow!("validation failed"))
}

fn trailing_note(report: &DecodeReport) -> String {
    match report.trailing_bytes {
        0 => "no trailing data".to_string(),
        n => format!("{n} trailing bytes after counted records"),
    }
}

/// One-line reason for a report that is not clean.
fn diagnostic(report: &DecodeReport) -> String {
    match (&report.termination, &report.failure) {
        (Termination::Complete, _) => format!(
            "{} record{} rejected ({} unknown tag{})",
            report.rejected,
            if report.rejected == 1 { "" } else { "s" },
            report.skipped_unknown,
            if report.skipped_unknown == 1 { "" } else { "s" },
        ),
        (termination, Some(failure)) => format!("{termination}: {failure}"),
        (termination, None) => termination.to_string(),
    }
}
