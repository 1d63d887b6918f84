// Row tokenizer: find row boundaries honoring quotes and escapes.
//
// This is a lightweight re-scan that does not depend on how many cells of
// the current row were consumed, so a row can be left at any cell boundary.

use super::chars::TextChar;
use super::cursor::Cursor;
use super::dialect::Dialect;
use crate::error::{Result, TableError};

/// Return the view starting at the next row.
///
/// Scans for the first newline outside quotes (and not escaped, when
/// escaping is on). With no newline left the result is empty. When the
/// dialect requires a delimiter and none remains, the remainder is treated
/// as end of data.
pub fn advance_row<'a, C: TextChar>(view: &'a [C], dialect: &Dialect<C>) -> &'a [C] {
    let mut in_quote = false;
    let mut n = 0;
    while n < view.len() {
        let c = view[n];
        if dialect.allow_escaped && c == dialect.escape {
            n += 2;
            continue;
        }
        if c == dialect.quote {
            if view.get(n + 1) == Some(&dialect.quote) {
                n += 2;
                continue;
            }
            in_quote = !in_quote;
        } else if c == dialect.newline && !in_quote {
            return guard_trailing(&view[n + 1..], dialect);
        }
        n += 1;
    }
    &view[view.len()..]
}

/// Collapse a remainder with no delimiter in it when the dialect asks for it.
fn guard_trailing<'a, C: TextChar>(rest: &'a [C], dialect: &Dialect<C>) -> &'a [C] {
    if !dialect.require_delimiter || rest.contains(&dialect.delimiter) {
        return rest;
    }
    if rest.iter().any(|c| !c.is_whitespace()) {
        log::warn!(
            "discarding {} trailing units with no delimiter as end of data",
            rest.len()
        );
    }
    &rest[rest.len()..]
}

/// Drop everything up to and including the next newline, ignoring quotes.
pub fn skip_raw_row<'a, C: TextChar>(view: &'a [C], newline: C) -> &'a [C] {
    match view.iter().position(|&c| c == newline) {
        Some(pos) => &view[pos + 1..],
        None => &view[view.len()..],
    }
}

/// Position the cursor at the header row.
///
/// Assumes nothing before the header is quoted. Without a header the cursor
/// is left where it is.
pub fn skip_to_header<C: TextChar>(cursor: &mut Cursor<'_, C>, dialect: &Dialect<C>) {
    let Some(header) = dialect.header_row else {
        return;
    };
    let mut view = cursor.remaining();
    for _ in 0..header {
        view = skip_raw_row(view, dialect.newline);
    }
    log::trace!("skipped {} rows to header", header);
    cursor.begin_row(view, header);
}

/// Move a cursor sitting on the header row (or on row 0 when there is no
/// header) to the first data row.
pub fn skip_to_data<C: TextChar>(
    cursor: &mut Cursor<'_, C>,
    dialect: &Dialect<C>,
) -> Result<()> {
    let skip_rows = match dialect.header_row {
        Some(header) => dialect.data_row - header,
        None => dialect.data_row,
    };
    if skip_rows > 0 && cursor.at_eof() {
        return Err(TableError::UnexpectedEndOfData {
            at: cursor.position(),
        });
    }
    let mut view = cursor.remaining();
    for _ in 0..skip_rows {
        view = if dialect.has_header() {
            advance_row(view, dialect)
        } else {
            skip_raw_row(view, dialect.newline)
        };
    }
    log::trace!("skipped {} rows to data", skip_rows);
    cursor.begin_row(view, dialect.data_row);
    Ok(())
}

/// Advance the cursor to the next row, resetting its column.
#[inline]
pub fn next_row<C: TextChar>(cursor: &mut Cursor<'_, C>, dialect: &Dialect<C>) {
    let rest = advance_row(cursor.remaining(), dialect);
    let row = cursor.row() + 1;
    cursor.begin_row(rest, row);
}

/// Count the rows left from the cursor on
pub fn count_rows<C: TextChar>(mut cursor: Cursor<'_, C>, dialect: &Dialect<C>) -> usize {
    let mut count = 0;
    while !cursor.at_eof() {
        next_row(&mut cursor, dialect);
        count += 1;
    }
    count
}

/// Start of every row left from the cursor on, paired with its row index
pub fn row_starts<'a, C: TextChar>(
    mut cursor: Cursor<'a, C>,
    dialect: &Dialect<C>,
) -> Vec<(&'a [C], usize)> {
    let mut starts = Vec::with_capacity(cursor.remaining().len() / 50 + 1);
    while !cursor.at_eof() {
        starts.push((cursor.remaining(), cursor.row()));
        next_row(&mut cursor, dialect);
    }
    starts
}
