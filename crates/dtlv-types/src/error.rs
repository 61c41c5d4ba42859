/// Errors about what a record *means*, as opposed to how it is framed.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   ├── UnknownTag for tags missing from the table    │
/// │   ├── DuplicateTag / ZeroCapacity at table build    │
/// │   ├── PayloadTooLong for views over 16-bit lengths  │
/// │   └── InvalidElementSize for zero-width elements    │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
  /// The tag has no entry in the capacity table.
  ///
  /// Unknown tags are a hard reject for storage purposes: there is no
  /// bound to size a copy against, so nothing is ever copied for them.
  #[error("unknown record tag {tag:#04X}")]
  UnknownTag { tag: u8 },

  /// A capacity table builder registered the same tag twice.
  #[error("tag {tag:#04X} registered twice in capacity table")]
  DuplicateTag { tag: u8 },

  /// A capacity table entry with a zero maximum.
  #[error("tag {tag:#04X} registered with zero capacity")]
  ZeroCapacity { tag: u8 },

  /// A payload view longer than the 16-bit length field can describe.
  #[error("payload of {len} bytes exceeds 16-bit length")]
  PayloadTooLong { len: usize },

  /// Element chunking requested with a zero element size.
  #[error("element size must be non-zero")]
  InvalidElementSize,
}
