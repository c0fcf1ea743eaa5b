//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where tokens, nodes and errors occur in query source.

use std::fmt;

/// A span of source code, represented by its starting position and length.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Merge two spans into one that starts at the earlier span and covers both.
    ///
    /// Spans on different lines keep the first position and sum the lengths.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line {
            let start_col = self.col.min(other.col);
            let end_col = (other.col + other.len).max(self.col + self.len);
            Span {
                line: self.line,
                col: start_col,
                len: end_col - start_col,
            }
        } else {
            let (first, second) = if self <= other { (self, other) } else { (other, self) };
            Span {
                line: first.line,
                col: first.col,
                len: first.len + second.len,
            }
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
