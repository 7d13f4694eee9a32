//! A bounds-checked sequential reader over an immutable byte buffer.

use crate::error::Error;
use bytes::Bytes;
use std::path::Path;

/// An immutable byte buffer plus a read offset.
///
/// The offset only ever moves forward. Slices handed out by [`Cursor::get`],
/// [`Cursor::peek`], and [`Cursor::remaining`] are zero-copy views into the
/// underlying buffer.
///
/// A cursor is exclusively owned by the single decode pass using it; it is
/// never shared across concurrent readers.
#[derive(Clone, Debug)]
pub struct Cursor {
    buf: Bytes,
    offset: usize,
}

impl Cursor {
    /// Creates a cursor positioned at the start of `buf`.
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            offset: 0,
        }
    }

    /// Creates a cursor over the full contents of the file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self::new(std::fs::read(path)?))
    }

    /// Returns the next `n` bytes and advances the offset by `n`.
    ///
    /// Requesting zero bytes yields an empty slice without failing; requesting
    /// more bytes than remain fails with [`Error::Underrun`].
    pub fn get(&mut self, n: usize) -> Result<Bytes, Error> {
        let result = self.peek(n)?;
        self.offset += n;
        Ok(result)
    }

    /// Returns the next `n` bytes without advancing the offset.
    pub fn peek(&self, n: usize) -> Result<Bytes, Error> {
        if n == 0 {
            return Ok(Bytes::new());
        }
        let remaining = self.remaining_len();
        if n > remaining {
            return Err(Error::Underrun {
                requested: n,
                remaining,
            });
        }
        Ok(self.buf.slice(self.offset..self.offset + n))
    }

    /// Returns every byte from the current offset to the end and advances the
    /// offset to the end.
    ///
    /// This is a one-shot, position-consuming operation: calling it twice
    /// returns empty the second time.
    pub fn remaining(&mut self) -> Bytes {
        let rest = self.buf.slice(self.offset..);
        self.offset = self.buf.len();
        rest
    }

    /// The current read offset.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// The number of unread bytes.
    pub fn remaining_len(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// True if any unread bytes remain.
    pub fn has_remaining(&self) -> bool {
        self.offset < self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_advances() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4]);
        assert_eq!(cursor.get(2).unwrap(), Bytes::from_static(&[1, 2]));
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.get(2).unwrap(), Bytes::from_static(&[3, 4]));
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn test_get_zero() {
        let mut cursor = Cursor::new(Bytes::new());
        assert_eq!(cursor.get(0).unwrap(), Bytes::new());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_underrun() {
        let mut cursor = Cursor::new(vec![1u8, 2]);
        assert!(matches!(
            cursor.get(3),
            Err(Error::Underrun {
                requested: 3,
                remaining: 2
            })
        ));
        // A failed read does not advance.
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let cursor = Cursor::new(vec![1u8, 2, 3]);
        assert_eq!(cursor.peek(2).unwrap(), Bytes::from_static(&[1, 2]));
        assert_eq!(cursor.peek(2).unwrap(), Bytes::from_static(&[1, 2]));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_remaining_is_one_shot() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        cursor.get(1).unwrap();
        assert_eq!(cursor.remaining(), Bytes::from_static(&[2, 3]));
        assert_eq!(cursor.remaining(), Bytes::new());
        assert_eq!(cursor.position(), 3);
    }
}
