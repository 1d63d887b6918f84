// Parse position over a borrowed buffer.

use super::chars::TextChar;
use super::dialect::Dialect;
use crate::error::Position;

/// The unread suffix of a buffer plus the row/column it corresponds to.
///
/// Owns nothing; copying a cursor is how a row is re-read.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a, C: TextChar = u8> {
    remaining: &'a [C],
    /// Cells consumed in the current row; the physical index of the next cell
    column: usize,
    row: usize,
    /// The last cell was followed by a delimiter, so one more (possibly
    /// empty) cell exists even at a newline or at end of data.
    pending_cell: bool,
}

impl<'a, C: TextChar> Cursor<'a, C> {
    pub fn new(buffer: &'a [C]) -> Self {
        Cursor {
            remaining: buffer,
            column: 0,
            row: 0,
            pending_cell: false,
        }
    }

    /// A cursor already positioned at the start of physical row `row`
    pub fn at_row(remaining: &'a [C], row: usize) -> Self {
        Cursor {
            remaining,
            column: 0,
            row,
            pending_cell: false,
        }
    }

    #[inline]
    pub fn remaining(&self) -> &'a [C] {
        self.remaining
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Nothing left in the current row
    #[inline]
    pub fn at_eol(&self, dialect: &Dialect<C>) -> bool {
        self.remaining.first().map_or(true, |&c| c == dialect.newline)
    }

    #[inline]
    pub(crate) fn pending_cell(&self) -> bool {
        self.pending_cell
    }

    /// Record that a cell was consumed and the view now starts at `rest`.
    #[inline]
    pub(crate) fn consume_cell(&mut self, rest: &'a [C], followed_by_delimiter: bool) {
        self.remaining = rest;
        self.column += 1;
        self.pending_cell = followed_by_delimiter;
    }

    /// Move to the start of a new row. `row` never decreases.
    #[inline]
    pub(crate) fn begin_row(&mut self, rest: &'a [C], row: usize) {
        debug_assert!(row >= self.row);
        self.remaining = rest;
        self.row = row;
        self.column = 0;
        self.pending_cell = false;
    }
}

/// Equal when both are exhausted, or both point at the same place in the
/// same buffer.
impl<C: TextChar> PartialEq for Cursor<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        (self.at_eof() && other.at_eof())
            || std::ptr::eq(self.remaining.as_ptr(), other.remaining.as_ptr())
    }
}

impl<C: TextChar> Eq for Cursor<'_, C> {}
