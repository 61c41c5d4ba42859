use crate::error::StoreError;

/// Fixed-capacity, append-only byte sink with a write cursor.
///
/// ```text
///  0                    cursor                 capacity
///  ├────── written ───────┼──────── free ─────────┤
///  │  readable snapshot   │  never readable       │
/// ```
///
/// Invariants:
///
/// - `0 <= cursor <= capacity` at all times.
/// - Every append either writes all of its bytes and advances the cursor
///   by exactly that many, or fails and leaves the buffer untouched. A
///   header can therefore never be written without its payload.
/// - Overflow is always an error. The only ways to write fewer bytes than
///   offered are [`append_truncated`](Self::append_truncated) and
///   [`append_saturating`](Self::append_saturating), where the caller asks
///   for it by name.
///
/// [`reset`](Self::reset) rewinds the cursor without zeroing memory;
/// stale bytes past the cursor are unreachable through the API.
pub struct BoundedBuffer {
    data: Box<[u8]>,
    cursor: usize,
}

impl BoundedBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes written so far (the cursor).
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Whether `n` more bytes would fit.
    #[must_use]
    pub fn fits(&self, n: usize) -> bool {
        self.end_for(n).is_some()
    }

    /// Append all of `bytes` or nothing.
    ///
    /// # Errors
    ///
    /// [`StoreError::CapacityExceeded`] if `cursor + bytes.len()` would
    /// pass the capacity. The buffer is unchanged.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        let end = self.end_for(bytes.len()).ok_or_else(|| self.overflow(bytes.len()))?;
        self.data[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
        Ok(())
    }

    /// Append several slices as one atomic write.
    ///
    /// Used for header + payload pairs: either the whole frame lands or
    /// none of it does.
    ///
    /// # Errors
    ///
    /// [`StoreError::CapacityExceeded`] if the combined length doesn't fit.
    pub fn append_parts(&mut self, parts: &[&[u8]]) -> Result<(), StoreError> {
        let total = parts
            .iter()
            .try_fold(0usize, |acc, part| acc.checked_add(part.len()))
            .ok_or_else(|| self.overflow(usize::MAX))?;
        let end = self.end_for(total).ok_or_else(|| self.overflow(total))?;

        for part in parts {
            let next = self.cursor + part.len();
            self.data[self.cursor..next].copy_from_slice(part);
            self.cursor = next;
        }
        debug_assert_eq!(self.cursor, end);
        Ok(())
    }

    /// Append at most `max_len` bytes of `bytes`.
    ///
    /// The clipped write is still all-or-nothing against the capacity.
    ///
    /// # Returns
    ///
    /// Number of bytes written.
    ///
    /// # Errors
    ///
    /// [`StoreError::CapacityExceeded`] if even the clipped slice doesn't fit.
    pub fn append_truncated(&mut self, bytes: &[u8], max_len: usize) -> Result<usize, StoreError> {
        let take = bytes.len().min(max_len);
        self.append(&bytes[..take])?;
        Ok(take)
    }

    /// Append as much of `bytes` as still fits, possibly nothing.
    ///
    /// # Returns
    ///
    /// Number of bytes written.
    pub fn append_saturating(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(self.remaining());
        self.data[self.cursor..self.cursor + take].copy_from_slice(&bytes[..take]);
        self.cursor += take;
        take
    }

    /// Overwrite bytes that were already written.
    ///
    /// The range `[offset, offset + bytes.len())` must lie inside
    /// `[0, cursor)`. Used to back-fill a count or marker once the data
    /// after it is known.
    ///
    /// # Errors
    ///
    /// [`StoreError::PatchOutOfBounds`] otherwise; nothing is written.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        let target = offset
            .checked_add(bytes.len())
            .filter(|&end| end <= self.cursor)
            .and_then(|end| self.data.get_mut(offset..end))
            .ok_or(StoreError::PatchOutOfBounds {
                offset,
                len: bytes.len(),
                cursor: self.cursor,
            })?;
        target.copy_from_slice(bytes);
        Ok(())
    }

    /// Rewind the cursor to zero. Memory is not cleared.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// The written bytes, `[0, cursor)`.
    #[must_use]
    pub fn snapshot(&self) -> &[u8] {
        &self.data[..self.cursor]
    }

    fn end_for(&self, n: usize) -> Option<usize> {
        self.cursor
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
    }

    fn overflow(&self, requested: usize) -> StoreError {
        StoreError::CapacityExceeded {
            capacity: self.data.len(),
            cursor: self.cursor,
            requested,
        }
    }
}

impl std::fmt::Debug for BoundedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedBuffer")
            .field("capacity", &self.data.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_advances_cursor_exactly() {
        let mut buf = BoundedBuffer::new(8);
        buf.append(&[1, 2, 3]).unwrap();
        assert_eq!(buf.len(), 3);
        buf.append(&[4, 5, 6, 7, 8]).unwrap();
        assert_eq!(buf.snapshot(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn overflow_leaves_buffer_unchanged() {
        let mut buf = BoundedBuffer::new(4);
        buf.append(&[0xAA, 0xBB]).unwrap();

        let result = buf.append(&[1, 2, 3]);
        assert!(matches!(
            result,
            Err(StoreError::CapacityExceeded {
                capacity: 4,
                cursor: 2,
                requested: 3
            })
        ));
        assert_eq!(buf.snapshot(), &[0xAA, 0xBB]);
    }

    #[test]
    fn empty_append_always_fits() {
        let mut buf = BoundedBuffer::new(0);
        buf.append(&[]).unwrap();
        assert!(buf.is_empty());
        assert!(buf.append(&[1]).is_err());
    }

    #[test]
    fn parts_are_all_or_nothing() {
        let mut buf = BoundedBuffer::new(6);
        buf.append_parts(&[&[1, 2], &[3]]).unwrap();
        assert_eq!(buf.snapshot(), &[1, 2, 3]);

        // Header fits on its own, payload doesn't: neither is written.
        assert!(buf.append_parts(&[&[9, 9], &[9, 9]]).is_err());
        assert_eq!(buf.snapshot(), &[1, 2, 3]);
    }

    #[test]
    fn truncated_append_is_explicit() {
        let mut buf = BoundedBuffer::new(16);
        let written = buf.append_truncated(b"calibration", 5).unwrap();
        assert_eq!(written, 5);
        assert_eq!(buf.snapshot(), b"calib");

        let written = buf.append_truncated(b"ok", 64).unwrap();
        assert_eq!(written, 2);

        assert!(buf.append_truncated(&[0; 32], 10).is_err());
        assert_eq!(buf.len(), 7);
    }

    #[test]
    fn saturating_append_fills_remaining_space() {
        let mut buf = BoundedBuffer::new(5);
        assert_eq!(buf.append_saturating(&[1, 2, 3]), 3);
        assert_eq!(buf.append_saturating(&[4, 5, 6, 7]), 2);
        assert_eq!(buf.append_saturating(&[8]), 0);
        assert_eq!(buf.snapshot(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn reset_hides_old_bytes() {
        let mut buf = BoundedBuffer::new(4);
        buf.append(&[1, 2, 3, 4]).unwrap();
        buf.reset();
        assert!(buf.snapshot().is_empty());
        buf.append(&[9]).unwrap();
        assert_eq!(buf.snapshot(), &[9]);
    }

    #[test]
    fn patch_only_inside_written_range() {
        let mut buf = BoundedBuffer::new(8);
        buf.append(&[0, 0, 0xAA, 0xBB]).unwrap();

        buf.patch(0, &[0x00, 0x02]).unwrap();
        assert_eq!(buf.snapshot(), &[0x00, 0x02, 0xAA, 0xBB]);

        // Reaches past the cursor even though capacity would allow it.
        assert!(matches!(
            buf.patch(3, &[1, 2]),
            Err(StoreError::PatchOutOfBounds {
                offset: 3,
                len: 2,
                cursor: 4
            })
        ));
        assert!(buf.patch(usize::MAX, &[1]).is_err());
        assert_eq!(buf.snapshot(), &[0x00, 0x02, 0xAA, 0xBB]);
    }

    #[test]
    fn fits_handles_overflowing_sizes() {
        let buf = BoundedBuffer::new(4);
        assert!(buf.fits(4));
        assert!(!buf.fits(5));
        assert!(!buf.fits(usize::MAX));
    }
}
