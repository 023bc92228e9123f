//! Placeholder sizing and reservation.
//!
//! Both patched values must overwrite their placeholders without moving any
//! byte of the file, so their widths are fixed before serialization: the
//! /Contents hex string from the signature capacity, the /ByteRange array
//! from a constant generous enough for any realistic file size.

use crate::error::Result;
use crate::signing::position::{ByteSpan, PlaceholderId, PositionTable, PositionTracker};

/// Fixed width of the /ByteRange placeholder in bytes, delimiters included.
///
/// Four integers, three separators, and two brackets fit comfortably for
/// files up to hundreds of gigabytes.
pub const BYTE_RANGE_PLACEHOLDER_WIDTH: usize = 36;

/// Hands out placeholder identities for a signing session.
///
/// Each save pass gets a fresh reservation so trackers never carry offsets
/// across passes.
#[derive(Debug, Default)]
pub struct PlaceholderAllocator {
    next_id: u64,
}

impl PlaceholderAllocator {
    /// Create a new allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve placeholders for one signature of up to
    /// `signature_capacity` raw bytes.
    pub fn reserve(&mut self, signature_capacity: usize) -> PlaceholderReservation {
        let contents = PositionTracker::new(PlaceholderId::new(self.next_id));
        let byte_range = PositionTracker::new(PlaceholderId::new(self.next_id + 1));
        self.next_id += 2;
        PlaceholderReservation {
            contents,
            byte_range,
            capacity: signature_capacity,
        }
    }
}

/// Placeholders reserved for one serialization pass.
#[derive(Debug)]
pub struct PlaceholderReservation {
    contents: PositionTracker,
    byte_range: PositionTracker,
    capacity: usize,
}

impl PlaceholderReservation {
    /// Maximum signature container length in raw bytes.
    pub fn signature_capacity(&self) -> usize {
        self.capacity
    }

    /// Width of the /Contents placeholder: two hex digits per byte plus
    /// the angle-bracket delimiters.
    pub fn contents_width(&self) -> usize {
        2 * self.capacity + 2
    }

    /// The serialized /Contents placeholder, all digits zero.
    pub fn contents_placeholder(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.contents_width());
        out.push(b'<');
        out.resize(self.contents_width() - 1, b'0');
        out.push(b'>');
        out
    }

    /// The serialized /ByteRange placeholder, zeros padded to the fixed
    /// width with whitespace before the closing bracket.
    pub fn byte_range_placeholder(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BYTE_RANGE_PLACEHOLDER_WIDTH);
        out.extend_from_slice(b"[0 0 0 0");
        out.resize(BYTE_RANGE_PLACEHOLDER_WIDTH - 1, b' ');
        out.push(b']');
        out
    }

    pub(crate) fn contents_id(&self) -> PlaceholderId {
        self.contents.id()
    }

    pub(crate) fn byte_range_id(&self) -> PlaceholderId {
        self.byte_range.id()
    }

    /// Resolve both placeholders against the completed pass.
    ///
    /// Returns the `(contents, byte_range)` spans. Each tracker resolves at
    /// most once; a reservation is single-use.
    pub fn resolve(&mut self, positions: &PositionTable) -> Result<(ByteSpan, ByteSpan)> {
        let contents = self.contents.resolve(positions)?;
        let byte_range = self.byte_range.resolve(positions)?;
        Ok((contents, byte_range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_contents_placeholder_shape() {
        let mut allocator = PlaceholderAllocator::new();
        let reservation = allocator.reserve(16);

        let bytes = reservation.contents_placeholder();
        assert_eq!(bytes.len(), 34);
        assert_eq!(bytes[0], b'<');
        assert_eq!(*bytes.last().unwrap(), b'>');
        assert!(bytes[1..33].iter().all(|&b| b == b'0'));
    }

    #[test]
    fn test_byte_range_placeholder_shape() {
        let mut allocator = PlaceholderAllocator::new();
        let reservation = allocator.reserve(16);

        let bytes = reservation.byte_range_placeholder();
        assert_eq!(bytes.len(), BYTE_RANGE_PLACEHOLDER_WIDTH);
        assert!(bytes.starts_with(b"[0 0 0 0"));
        assert_eq!(*bytes.last().unwrap(), b']');
    }

    #[test]
    fn test_reservations_use_distinct_ids() {
        let mut allocator = PlaceholderAllocator::new();
        let a = allocator.reserve(8);
        let b = allocator.reserve(8);

        assert_ne!(a.contents_id(), a.byte_range_id());
        assert_ne!(a.contents_id(), b.contents_id());
        assert_ne!(a.byte_range_id(), b.byte_range_id());
    }

    #[test]
    fn test_resolve_round_trip() {
        let mut allocator = PlaceholderAllocator::new();
        let mut reservation = allocator.reserve(8);

        let mut table = PositionTable::new();
        table.record(reservation.contents_id(), ByteSpan::new(100, 118));
        table.record(reservation.byte_range_id(), ByteSpan::new(130, 166));

        let (contents, byte_range) = reservation.resolve(&table).unwrap();
        assert_eq!(contents, ByteSpan::new(100, 118));
        assert_eq!(byte_range, ByteSpan::new(130, 166));

        // single-use
        let err = reservation.resolve(&table).unwrap_err();
        assert!(matches!(err, Error::StalePosition(_)));
    }
}
