/// Implementation of `dtlv encode`.
///
/// Parses a JSON manifest describing a sequence of records and writes
/// the encoded message with `RecordEncoder`.
///
/// # Manifest format
///
/// ```json
/// {
///   "layout": "tag_id_length",
///   "count_prefix": true,
///   "records": [
///     { "tag": "dtc_log",  "id": 7,     "payload_hex": "aabbcc" },
///     { "tag": "did_data", "id": 61441, "payload_hex": "0102" },
///     { "tag": 127,        "id": 1,     "payload": "free text" },
///     { "tag": "firmware_chunk", "id": 0, "payload_file": "chunk0.bin" }
///   ]
/// }
/// ```
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Key          │ Meaning                                              │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ layout       │ tag_id_length (default) | tag_length                 │
/// │ count_prefix │ emit a two-byte record count (default false)         │
/// │ tag          │ tag name (see `RecordTag::name`) or a byte 0..=255   │
/// │ id           │ record id; must be absent for tag_length             │
/// │ payload      │ UTF-8 text                                           │
/// │ payload_hex  │ hex bytes                                            │
/// │ payload_file │ raw file, relative to the manifest's directory       │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
///
/// Exactly one of the three payload keys may be given; none means an
/// empty payload.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use dtlv_decoder::RecordLayout;
use dtlv_encoder::RecordEncoder;
use dtlv_types::RecordTag;

use crate::EncodeArgs;

// ── Manifest serde types ──────────────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct Manifest {
    #[serde(default)]
    layout: ManifestLayout,
    #[serde(default)]
    count_prefix: bool,
    records: Vec<ManifestRecord>,
}

#[derive(serde::Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum ManifestLayout {
    #[default]
    TagIdLength,
    TagLength,
}

#[derive(serde::Deserialize)]
struct ManifestRecord {
    tag: ManifestTag,
    id: Option<u16>,
    payload: Option<String>,
    payload_hex: Option<String>,
    payload_file: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ManifestTag {
    Byte(u8),
    Name(String),
}

// ── Public entry point ────────────────────────────────────────────────────────

pub fn run(args: &EncodeArgs) -> Result<()> {
    let manifest_src = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;

    let manifest: Manifest = serde_json::from_str(&manifest_src)
        .with_context(|| format!("failed to parse manifest {}", args.input.display()))?;

    let manifest_dir = args.input.parent().unwrap_or_else(|| Path::new("."));

    let mut encoder = RecordEncoder::new();
    encoder.with_layout(match manifest.layout {
        ManifestLayout::TagIdLength => RecordLayout::TagIdLength,
        ManifestLayout::TagLength => RecordLayout::TagLength,
    });
    if manifest.count_prefix {
        encoder.with_count_prefix();
    }

    for (idx, record) in manifest.records.iter().enumerate() {
        apply_record(&mut encoder, record, manifest_dir)
            .with_context(|| format!("record {idx}: failed to apply"))?;
    }

    let bytes = encoder
        .encode()
        .with_context(|| "RecordEncoder::encode failed")?;

    let written = if args.hex {
        let mut text = hex::encode(&bytes);
        text.push('\n');
        fs::write(&args.output, &text)
            .with_context(|| format!("cannot write {}", args.output.display()))?;
        text.len()
    } else {
        fs::write(&args.output, &bytes)
            .with_context(|| format!("cannot write {}", args.output.display()))?;
        bytes.len()
    };

    println!(
        "Wrote {} record{} ({written} bytes) to {}",
        encoder.len(),
        if encoder.len() == 1 { "" } else { "s" },
        args.output.display()
    );
    Ok(())
}

// ── Record application helpers ────────────────────────────────────────────────

fn apply_record(encoder: &mut RecordEncoder, record: &ManifestRecord, manifest_dir: &Path) -> Result<()> {
    let tag = resolve_tag(&record.tag)?;
    let payload = resolve_payload(record, manifest_dir)?;
    match record.id {
        Some(id) => encoder.add_record(tag, id, &payload),
        None => encoder.add_record_without_id(tag, &payload),
    };
    Ok(())
}

/// Tag byte from a number or one of the `RecordTag` names.
fn resolve_tag(tag: &ManifestTag) -> Result<u8> {
    match tag {
        ManifestTag::Byte(b) => Ok(*b),
        ManifestTag::Name(name) => RecordTag::KNOWN
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.wire_id())
            .ok_or_else(|| anyhow!("unknown tag name {name:?}")),
    }
}

fn resolve_payload(record: &ManifestRecord, manifest_dir: &Path) -> Result<Vec<u8>> {
    match (&record.payload, &record.payload_hex, &record.payload_file) {
        (None, None, None) => Ok(Vec::new()),
        (Some(text), None, None) => Ok(text.as_bytes().to_vec()),
        (None, Some(digits), None) => {
            hex::decode(digits).with_context(|| format!("invalid payload_hex {digits:?}"))
        }
        (None, None, Some(file)) => {
            let path = manifest_dir.join(file);
            fs::read(&path).with_context(|| format!("cannot read {}", path.display()))
        }
        _ => bail!("give at most one of payload, payload_hex, payload_file"),
    }
}
