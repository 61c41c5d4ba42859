//! Reading message files, raw or hex.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Read a message file. With `hex`, the file is hex text and any ASCII
/// whitespace in it is ignored.
pub fn read_message(path: &Path, hex: bool) -> Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    if !hex {
        debug!(path = %path.display(), bytes = bytes.len(), "message loaded");
        return Ok(bytes);
    }

    let digits: Vec<u8> = bytes
        .into_iter()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let message =
        hex::decode(&digits).with_context(|| format!("{} is not valid hex", path.display()))?;
    debug!(path = %path.display(), bytes = message.len(), "hex message loaded");
    Ok(message)
}

/// Hex dump, 16 bytes per line, offset and ASCII columns.
pub fn dump(bytes: &[u8], indent: &str) {
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offset = i * 16;
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        let hex = hex.join(" ");
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();
        println!("{indent}{offset:04x}  {hex:<48}  {ascii}");
    }
}
