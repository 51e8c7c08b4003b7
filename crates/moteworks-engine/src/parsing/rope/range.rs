use serde::{Deserialize, Serialize};

/// A byte range `[start, end)` into the source document.
///
/// Diagnostics, hovers, completions and spellcheck words are all anchored with
/// one of these, so offsets are always document-absolute, never line-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextRange {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the range is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// True when `other` lies entirely within this range.
    #[must_use]
    pub fn contains(self, other: TextRange) -> bool {
        other.start >= self.start && other.end <= self.end && other.start <= other.end
    }

    /// Shifts a line-relative range by `base` to make it document-absolute.
    #[must_use]
    pub fn offset(self, base: usize) -> Self {
        Self {
            start: self.start + base,
            end: self.end + base,
        }
    }
}
