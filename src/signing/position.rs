//! Byte-offset tracking for placeholder objects.
//!
//! Placeholders are written during serialization at positions that are not
//! known in advance. The writer records, for each placeholder, the absolute
//! byte interval it ended up occupying; trackers resolve those intervals
//! once serialization is complete.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Handle identifying one placeholder across a serialization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderId(u64);

impl PlaceholderId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// An absolute half-open byte interval `[start, end)` in the serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    /// First byte of the interval
    pub start: usize,
    /// One past the last byte of the interval
    pub end: usize,
}

impl ByteSpan {
    /// Create a new span. `start` must not exceed `end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Length of the interval in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check whether the interval is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Resolved placeholder offsets for one serialization pass.
///
/// Populated exactly once by the writer while it emits bytes. A fresh table
/// is produced for every pass, so spans recorded here are only meaningful
/// against the byte stream of the pass that produced them.
#[derive(Debug, Default)]
pub struct PositionTable {
    spans: HashMap<PlaceholderId, ByteSpan>,
}

impl PositionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where a placeholder landed. Called by the writer.
    pub(crate) fn record(&mut self, id: PlaceholderId, span: ByteSpan) {
        self.spans.insert(id, span);
    }

    /// Look up the span recorded for a placeholder, if any.
    pub fn get(&self, id: PlaceholderId) -> Option<ByteSpan> {
        self.spans.get(&id).copied()
    }

    /// Number of placeholders recorded in this pass.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Check whether any placeholder was recorded.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Tracks the final byte interval of exactly one placeholder object.
///
/// Before serialization the offsets are undefined; after serialization the
/// tracker resolves to an absolute interval exactly once. Resolving twice,
/// or against a pass that never recorded the placeholder, is a contract
/// violation reported as [`Error::StalePosition`].
#[derive(Debug)]
pub struct PositionTracker {
    id: PlaceholderId,
    resolved: bool,
}

impl PositionTracker {
    /// Create a tracker bound to one placeholder.
    pub(crate) fn new(id: PlaceholderId) -> Self {
        Self {
            id,
            resolved: false,
        }
    }

    /// The placeholder this tracker is bound to.
    pub fn id(&self) -> PlaceholderId {
        self.id
    }

    /// Resolve the placeholder's absolute byte interval.
    ///
    /// Must be called at most once per serialization pass, after the pass
    /// has completed.
    pub fn resolve(&mut self, positions: &PositionTable) -> Result<ByteSpan> {
        if self.resolved {
            return Err(Error::StalePosition(format!(
                "placeholder {:?} resolved twice without a new serialization pass",
                self.id
            )));
        }
        let span = positions.get(self.id).ok_or_else(|| {
            Error::StalePosition(format!(
                "placeholder {:?} has no recorded position; serialization has not completed",
                self.id
            ))
        })?;
        self.resolved = true;
        Ok(span)
    }
}
