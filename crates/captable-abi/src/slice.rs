//! Non-owning byte views passed across the table.

use std::marker::PhantomData;
use std::ptr;

use thiserror::Error;

/// Error reading a [`ByteSlice`] as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SliceError {
    /// The slice pointer was null.
    #[error("byte slice is null")]
    Null,
    /// The bytes are not valid UTF-8.
    #[error("byte slice is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the longest valid UTF-8 prefix.
        valid_up_to: usize,
    },
}

/// A `(pointer, length)` view over bytes owned by someone else.
///
/// No terminator is assumed and no ownership is transferred. The bytes must
/// stay valid for the duration of the call that receives the slice; a
/// receiver that wants to keep them must copy them out.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ByteSlice {
    /// Address of the first byte, or null for "no value".
    pub bytes: *const u8,
    /// Number of bytes.
    pub len: usize,
}

impl ByteSlice {
    /// The null slice. Used as the "success" return of a command.
    pub const fn null() -> Self {
        Self {
            bytes: ptr::null(),
            len: 0,
        }
    }

    /// Views `bytes` without copying.
    pub const fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.as_ptr(),
            len: bytes.len(),
        }
    }

    /// Views the UTF-8 bytes of `s` without copying.
    pub const fn from_text(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Returns `true` if the pointer is null.
    pub fn is_null(&self) -> bool {
        self.bytes.is_null()
    }

    /// Returns `true` if the slice is null or has zero length.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_null() || self.len == 0
    }

    /// Reads the viewed bytes. A null slice reads as empty.
    ///
    /// # Safety
    ///
    /// If non-null, `bytes` must point to `len` initialized bytes that stay
    /// valid and unmodified for `'a`.
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        if self.bytes.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.bytes, self.len) }
    }

    /// Reads the viewed bytes as UTF-8 text.
    ///
    /// # Safety
    ///
    /// Same contract as [`ByteSlice::as_bytes`].
    pub unsafe fn as_str<'a>(&self) -> Result<&'a str, SliceError> {
        if self.bytes.is_null() {
            return Err(SliceError::Null);
        }
        let bytes = unsafe { self.as_bytes() };
        std::str::from_utf8(bytes).map_err(|e| SliceError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })
    }

    /// Binds the slice to the lifetime of the data it was created from.
    pub fn borrowed<'a>(bytes: &'a [u8]) -> BorrowedSlice<'a> {
        BorrowedSlice {
            raw: Self::from_bytes(bytes),
            _marker: PhantomData,
        }
    }
}

impl Default for ByteSlice {
    fn default() -> Self {
        Self::null()
    }
}

impl std::fmt::Debug for ByteSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteSlice")
            .field("bytes", &self.bytes)
            .field("len", &self.len)
            .finish()
    }
}

/// A [`ByteSlice`] that the borrow checker ties to its backing storage.
///
/// Host code builds these for the duration of one call so the raw view
/// cannot outlive the buffer it points into.
#[derive(Clone, Copy, Debug)]
pub struct BorrowedSlice<'a> {
    raw: ByteSlice,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> BorrowedSlice<'a> {
    /// The raw view to hand across the ABI.
    pub fn raw(&self) -> ByteSlice {
        self.raw
    }

    /// Reads the bytes back safely.
    pub fn as_bytes(&self) -> &'a [u8] {
        // Constructed from a live `&'a [u8]`.
        unsafe { self.raw.as_bytes() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_preserves_pointer_and_length() {
        let buffer = vec![0u8, 1, 2, 255, 128, 7];
        let slice = ByteSlice::from_bytes(&buffer);

        assert_eq!(slice.bytes, buffer.as_ptr());
        assert_eq!(slice.len, buffer.len());

        let read = unsafe { slice.as_bytes() };
        assert_eq!(read.as_ptr(), buffer.as_ptr());
        assert_eq!(read, &buffer[..]);
    }

    #[test]
    fn test_view_of_subrange_has_no_terminator() {
        let text = "save-all";
        let slice = ByteSlice::from_bytes(&text.as_bytes()[..4]);
        assert_eq!(unsafe { slice.as_str() }, Ok("save"));
    }

    #[test]
    fn test_null_slice() {
        let slice = ByteSlice::null();
        assert!(slice.is_null());
        assert!(slice.is_empty());
        assert!(unsafe { slice.as_bytes() }.is_empty());
        assert_eq!(unsafe { slice.as_str() }, Err(SliceError::Null));
    }

    #[test]
    fn test_empty_non_null_slice_is_empty_but_valid_text() {
        let slice = ByteSlice::from_text("");
        assert!(!slice.is_null());
        assert!(slice.is_empty());
        assert_eq!(unsafe { slice.as_str() }, Ok(""));
    }

    #[test]
    fn test_invalid_utf8_reports_prefix() {
        let bytes = [b'o', b'k', 0xff, b'!'];
        let slice = ByteSlice::from_bytes(&bytes);
        assert_eq!(
            unsafe { slice.as_str() },
            Err(SliceError::InvalidUtf8 { valid_up_to: 2 })
        );
    }

    #[test]
    fn test_borrowed_slice_reads_back() {
        let data = b"status".to_vec();
        let borrowed = ByteSlice::borrowed(&data);
        assert_eq!(borrowed.as_bytes(), b"status");
        assert_eq!(borrowed.raw().bytes, data.as_ptr());
    }
}
