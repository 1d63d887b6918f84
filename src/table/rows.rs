// Lazy row iterator with an explicit end state.

use super::assembler::{decode_row, FromRow};
use super::resolver::Locations;
use super::Table;
use crate::core::{next_row, Cursor, TextChar};
use crate::error::Result;
use std::fmt;
use std::marker::PhantomData;

enum State<'a, C: TextChar> {
    Positioned {
        table: Table<C>,
        cursor: Cursor<'a, C>,
        locations: Locations<'a, C>,
    },
    End,
}

/// Iterator over the data rows of a buffer, decoding each into `R`.
///
/// Two iterators compare equal when both are at the end, or both sit on
/// the same row of the same buffer. A positioned iterator whose cursor has
/// run out of data compares equal to [`Rows::end`].
pub struct Rows<'a, R, C: TextChar = u8> {
    state: State<'a, C>,
    _record: PhantomData<fn() -> R>,
}

impl<'a, R, C: TextChar> Rows<'a, R, C> {
    /// The terminal sentinel
    pub fn end() -> Self {
        Rows {
            state: State::End,
            _record: PhantomData,
        }
    }

    /// `cursor` must sit on the first data row
    pub(crate) fn positioned(
        table: Table<C>,
        cursor: Cursor<'a, C>,
        locations: Locations<'a, C>,
    ) -> Self {
        if cursor.at_eof() {
            return Self::end();
        }
        Rows {
            state: State::Positioned {
                table,
                cursor,
                locations,
            },
            _record: PhantomData,
        }
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self.state, State::End)
    }

    /// Move to the next row. Does nothing at the end.
    pub fn advance(&mut self) {
        if let State::Positioned { table, cursor, .. } = &mut self.state {
            next_row(cursor, table.dialect());
            if cursor.at_eof() {
                self.state = State::End;
            }
        }
    }

    fn at_eof(&self) -> bool {
        match &self.state {
            State::Positioned { cursor, .. } => cursor.at_eof(),
            State::End => true,
        }
    }
}

impl<'a, R: FromRow<'a, C>, C: TextChar> Rows<'a, R, C> {
    /// Decode the current row. Repeatable; the position does not move.
    ///
    /// Returns `None` at the end.
    pub fn current(&mut self) -> Option<Result<R>> {
        match &mut self.state {
            State::Positioned {
                table,
                cursor,
                locations,
            } => Some(decode_row(*cursor, locations, table.schema(), table.dialect())),
            State::End => None,
        }
    }
}

impl<R, C: TextChar> Default for Rows<'_, R, C> {
    fn default() -> Self {
        Self::end()
    }
}

impl<R, C: TextChar> PartialEq for Rows<'_, R, C> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.state, &other.state) {
            (State::Positioned { cursor: a, .. }, State::Positioned { cursor: b, .. }) => a == b,
            _ => self.at_eof() && other.at_eof(),
        }
    }
}

impl<R, C: TextChar> fmt::Debug for Rows<'_, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Positioned { cursor, .. } => f
                .debug_struct("Rows")
                .field("row", &cursor.row())
                .field("remaining", &cursor.remaining().len())
                .finish(),
            State::End => f.write_str("Rows(End)"),
        }
    }
}

/// Yields one item per data row. A failed row is yielded once and ends
/// the iteration.
impl<'a, R: FromRow<'a, C>, C: TextChar> Iterator for Rows<'a, R, C> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.current()?;
        if item.is_ok() {
            self.advance();
        } else {
            self.state = State::End;
        }
        Some(item)
    }
}
