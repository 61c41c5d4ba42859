use crate::error::DecodeError;

/// An immutable view of the bytes to decode.
///
/// Borrowed for the duration of one decode call and never retained.
/// When the caller also supplies a length (say, from a frame header of
/// an outer protocol), that length is checked against the slice before
/// anything else happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawInput<'a> {
    bytes: &'a [u8],
}

impl<'a> RawInput<'a> {
    /// View the first `declared_len` bytes of `bytes`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::DeclaredLengthExceedsBuffer`] if `declared_len` is
    /// larger than `bytes.len()`.
    pub fn new(bytes: &'a [u8], declared_len: usize) -> Result<Self, DecodeError> {
        let bytes = bytes
            .get(..declared_len)
            .ok_or(DecodeError::DeclaredLengthExceedsBuffer {
                declared: declared_len,
                actual: bytes.len(),
            })?;
        Ok(Self { bytes })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl<'a> From<&'a [u8]> for RawInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for RawInput<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self { bytes }
    }
}

impl<'a> From<&'a Vec<u8>> for RawInput<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self { bytes }
    }
}
