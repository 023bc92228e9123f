//! ByteRange view and descriptor for PDF signatures.
//!
//! PDF digital signatures use a ByteRange array to specify which portions
//! of the document are covered by the signature. The signature itself is
//! stored in a placeholder that is excluded from the signed bytes: its
//! final content is not known at signing time, so it cannot be part of
//! what gets signed.
//!
//! ## ByteRange Format
//!
//! The ByteRange is an array of four integers
//! `[0, contents_start, contents_end, file_length - contents_end]`
//! where `[contents_start, contents_end)` is the interval occupied by the
//! /Contents hex string including its angle-bracket delimiters.

use crate::error::{Error, Result};
use crate::signing::position::ByteSpan;
use std::io::Read;

/// A logical view of a byte stream with one interval excluded.
///
/// Presents `stream[..exclude_start]` followed by `stream[exclude_end..]`
/// as a single sequence. Implements [`Read`] so large documents can be
/// hashed in one streaming pass without materializing the concatenation.
#[derive(Debug)]
pub struct ByteRangeView<'a> {
    head: &'a [u8],
    tail: &'a [u8],
    pos: usize,
}

impl<'a> ByteRangeView<'a> {
    /// Create a view over `stream` excluding `[exclude_start, exclude_end)`.
    pub fn new(stream: &'a [u8], exclude_start: usize, exclude_end: usize) -> Result<Self> {
        if exclude_start > exclude_end || exclude_end > stream.len() {
            return Err(Error::InvalidPdf(format!(
                "byte range exclusion [{}, {}) out of bounds for stream of {} bytes",
                exclude_start,
                exclude_end,
                stream.len()
            )));
        }
        Ok(Self {
            head: &stream[..exclude_start],
            tail: &stream[exclude_end..],
            pos: 0,
        })
    }

    /// Create a view covering the whole stream, excluding nothing.
    pub fn whole(stream: &'a [u8]) -> Self {
        Self {
            head: stream,
            tail: &[],
            pos: 0,
        }
    }

    /// Total number of bytes the view exposes.
    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    /// Check whether the view exposes no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the view as a contiguous buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(self.head);
        out.extend_from_slice(self.tail);
        out
    }
}

impl Read for ByteRangeView<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut written = 0;
        while written < buf.len() && self.pos < self.len() {
            let (slice, offset) = if self.pos < self.head.len() {
                (self.head, self.pos)
            } else {
                (self.tail, self.pos - self.head.len())
            };
            let n = (slice.len() - offset).min(buf.len() - written);
            buf[written..written + n].copy_from_slice(&slice[offset..offset + n]);
            written += n;
            self.pos += n;
        }
        Ok(written)
    }
}

/// The four-integer byte-range descriptor of a signed document.
///
/// Invariant: the spans partition the file exactly, with no gap or overlap
/// other than the excluded placeholder interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRangeDescriptor {
    values: [i64; 4],
}

impl ByteRangeDescriptor {
    /// Compute the descriptor for a file of `file_len` bytes whose
    /// signature placeholder occupies `contents`.
    pub fn compute(file_len: usize, contents: ByteSpan) -> Result<Self> {
        if contents.start >= contents.end || contents.end > file_len {
            return Err(Error::InvalidPdf(format!(
                "contents placeholder [{}, {}) does not fit in file of {} bytes",
                contents.start, contents.end, file_len
            )));
        }
        Ok(Self {
            values: [
                0,
                contents.start as i64,
                contents.end as i64,
                (file_len - contents.end) as i64,
            ],
        })
    }

    /// The four raw values `[0, c0, c1, L - c1]`.
    pub fn values(&self) -> [i64; 4] {
        self.values
    }

    /// Check that the descriptor partitions a file of `file_len` bytes.
    pub fn covers(&self, file_len: usize) -> bool {
        let [off1, len1, off2, len2] = self.values;
        off1 == 0 && len1 >= 0 && len1 <= off2 && off2 + len2 == file_len as i64
    }

    /// Format as a PDF array padded to exactly `width` bytes.
    ///
    /// Padding spaces are inserted before the closing delimiter, so the
    /// formatted descriptor overwrites its placeholder without changing the
    /// total stream length.
    pub fn format_padded(&self, width: usize) -> Result<Vec<u8>> {
        let [a, b, c, d] = self.values;
        let body = format!("[{} {} {} {}", a, b, c, d);
        if body.len() + 1 > width {
            return Err(Error::InvalidPdf(format!(
                "byte range descriptor needs {} bytes but only {} are reserved",
                body.len() + 1,
                width
            )));
        }
        let mut out = Vec::with_capacity(width);
        out.extend_from_slice(body.as_bytes());
        out.resize(width - 1, b' ');
        out.push(b']');
        Ok(out)
    }
}
