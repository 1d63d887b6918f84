// Cell tokenizer: extract the next cell of the current row without copying.

use super::chars::TextChar;
use super::cursor::Cursor;
use super::dialect::Dialect;
use crate::error::{Result, TableError};
use std::borrow::Cow;

/// One cell as a sub-slice of the caller's buffer.
///
/// For quoted cells `span` excludes the surrounding quotes but still holds
/// doubled quotes verbatim; [`Cell::text`] collapses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'a, C: TextChar = u8> {
    pub span: &'a [C],
    pub quoted: bool,
    /// Unquoted cell containing at least one escape character
    pub escaped: bool,
}

impl<'a, C: TextChar> Cell<'a, C> {
    pub fn plain(span: &'a [C]) -> Self {
        Cell {
            span,
            quoted: false,
            escaped: false,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Cell contents with quoting undone.
    /// Borrowed when nothing needs unescaping, owned otherwise.
    pub fn text(&self, dialect: &Dialect<C>) -> Cow<'a, [C]> {
        if self.quoted {
            unescape_doubled(self.span, dialect.quote)
        } else if self.escaped {
            Cow::Owned(unescape_backslash(self.span, dialect.escape))
        } else {
            Cow::Borrowed(self.span)
        }
    }
}

/// Collapse doubled quotes (`""` -> `"`)
fn unescape_doubled<C: TextChar>(span: &[C], quote: C) -> Cow<'_, [C]> {
    // Fast path: no escaped quotes inside
    if !span.contains(&quote) {
        return Cow::Borrowed(span);
    }

    let mut result = Vec::with_capacity(span.len());
    let mut i = 0;
    while i < span.len() {
        if span[i] == quote && i + 1 < span.len() && span[i + 1] == quote {
            result.push(quote);
            i += 2;
        } else {
            result.push(span[i]);
            i += 1;
        }
    }
    Cow::Owned(result)
}

/// Drop each escape character, keeping the one it protects
fn unescape_backslash<C: TextChar>(span: &[C], escape: C) -> Vec<C> {
    let mut result = Vec::with_capacity(span.len());
    let mut iter = span.iter();
    while let Some(&c) = iter.next() {
        if c == escape {
            if let Some(&next) = iter.next() {
                result.push(next);
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Skip whitespace, stopping at the row terminator
#[inline]
fn trim_left<'a, C: TextChar>(view: &'a [C], newline: C) -> &'a [C] {
    let pos = view
        .iter()
        .position(|&c| c == newline || !c.is_whitespace())
        .unwrap_or(view.len());
    &view[pos..]
}

/// Read the next cell of the current row and advance the cursor past it.
///
/// A delimiter following the cell is consumed too; a newline is left for the
/// row tokenizer.
pub fn next_cell<'a, C: TextChar>(
    cursor: &mut Cursor<'a, C>,
    dialect: &Dialect<C>,
) -> Result<Cell<'a, C>> {
    let view = cursor.remaining();

    if cursor.at_eol(dialect) {
        // A blank row holds one empty cell, and a trailing delimiter
        // announces one more. Anything else is reading past the row.
        if cursor.pending_cell() || (cursor.column() == 0 && !view.is_empty()) {
            cursor.consume_cell(view, false);
            return Ok(Cell::plain(&view[..0]));
        }
        return Err(if view.is_empty() {
            TableError::UnexpectedEndOfData {
                at: cursor.position(),
            }
        } else {
            TableError::UnexpectedEndOfRow {
                at: cursor.position(),
            }
        });
    }

    let view = if dialect.skip_leading_whitespace {
        trim_left(view, dialect.newline)
    } else {
        view
    };

    match view.first() {
        None => {
            cursor.consume_cell(view, false);
            Ok(Cell::plain(view))
        }
        Some(&c) if c == dialect.newline => {
            cursor.consume_cell(view, false);
            Ok(Cell::plain(&view[..0]))
        }
        Some(&c) if c == dialect.quote => quoted_cell(cursor, view, dialect),
        Some(_) => Ok(unquoted_cell(cursor, view, dialect)),
    }
}

fn unquoted_cell<'a, C: TextChar>(
    cursor: &mut Cursor<'a, C>,
    view: &'a [C],
    dialect: &Dialect<C>,
) -> Cell<'a, C> {
    let mut escaped = false;
    let mut pos = 0;
    while pos < view.len() {
        let c = view[pos];
        if dialect.allow_escaped && c == dialect.escape {
            escaped = true;
            pos += 2;
            continue;
        }
        if c == dialect.delimiter || c == dialect.newline {
            break;
        }
        pos += 1;
    }
    let pos = pos.min(view.len());

    let span = &view[..pos];
    let rest = &view[pos..];
    let cell = Cell {
        span,
        quoted: false,
        escaped,
    };
    match rest.first() {
        Some(&c) if c == dialect.delimiter => cursor.consume_cell(&rest[1..], true),
        _ => cursor.consume_cell(rest, false),
    }
    cell
}

fn quoted_cell<'a, C: TextChar>(
    cursor: &mut Cursor<'a, C>,
    view: &'a [C],
    dialect: &Dialect<C>,
) -> Result<Cell<'a, C>> {
    let inner = &view[1..];
    let mut pos = 0;
    loop {
        match inner.get(pos) {
            None => {
                return Err(TableError::MalformedQuotedCell {
                    at: cursor.position(),
                })
            }
            Some(&c) if c == dialect.quote => {
                if inner.get(pos + 1) == Some(&dialect.quote) {
                    pos += 2;
                    continue;
                }
                break;
            }
            Some(_) => pos += 1,
        }
    }

    let span = &inner[..pos];
    let rest = trim_left(&inner[pos + 1..], dialect.newline);
    let followed_by_delimiter = match rest.first() {
        None => false,
        Some(&c) if c == dialect.newline => false,
        Some(&c) if c == dialect.delimiter => true,
        Some(_) => {
            return Err(TableError::MalformedRow {
                at: cursor.position(),
            })
        }
    };
    let rest = if followed_by_delimiter { &rest[1..] } else { rest };
    cursor.consume_cell(rest, followed_by_delimiter);

    Ok(Cell {
        span,
        quoted: true,
        escaped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(input: &[u8], dialect: &Dialect<u8>) -> Vec<String> {
        let mut cur = Cursor::new(input);
        let mut out = Vec::new();
        while !cur.at_eol(dialect) || cur.pending_cell() {
            let cell = next_cell(&mut cur, dialect).unwrap();
            out.push(String::from_utf8(cell.text(dialect).into_owned()).unwrap());
        }
        out
    }

    #[test]
    fn test_unquoted_cells() {
        let d = Dialect::csv();
        assert_eq!(cells(b"a,b,c\nnext", &d), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_cell_with_delimiter() {
        let d = Dialect::csv();
        assert_eq!(cells(b"\"a,b\",c\n", &d), vec!["a,b", "c"]);
    }

    #[test]
    fn test_doubled_quote_collapses() {
        let d = Dialect::csv();
        let mut cur = Cursor::new(&b"\"a\"\"b\"\n"[..]);
        let cell = next_cell(&mut cur, &d).unwrap();
        assert_eq!(cell.span, b"a\"\"b");
        assert!(cell.quoted);
        assert_eq!(cell.text(&d).as_ref(), b"a\"b");
        assert!(cur.at_eol(&d));
    }

    #[test]
    fn test_quoted_cell_is_borrowed_without_doubled_quotes() {
        let d = Dialect::csv();
        let mut cur = Cursor::new(&b"\"plain\",x"[..]);
        let cell = next_cell(&mut cur, &d).unwrap();
        assert!(matches!(cell.text(&d), Cow::Borrowed(b"plain")));
    }

    #[test]
    fn test_embedded_newline_in_quotes() {
        let d = Dialect::csv();
        assert_eq!(cells(b"\"line1\nline2\",z\n", &d), vec!["line1\nline2", "z"]);
    }

    #[test]
    fn test_trailing_empty_cell() {
        let d = Dialect::csv();
        assert_eq!(cells(b"a,b,\n", &d), vec!["a", "b", ""]);
        assert_eq!(cells(b"a,", &d), vec!["a", ""]);
    }

    #[test]
    fn test_whitespace_after_closing_quote() {
        let d = Dialect::csv();
        assert_eq!(cells(b"\"bye\"  , 44\n", &d), vec!["bye", " 44"]);
    }

    #[test]
    fn test_garbage_after_closing_quote() {
        let d = Dialect::csv();
        let mut cur = Cursor::new(&b"\"abc\"x,1\n"[..]);
        let err = next_cell(&mut cur, &d).unwrap_err();
        assert!(matches!(err, TableError::MalformedRow { .. }));
    }

    #[test]
    fn test_unterminated_quote() {
        let d = Dialect::csv();
        let mut cur = Cursor::new(&b"\"abc,def\n"[..]);
        let err = next_cell(&mut cur, &d).unwrap_err();
        assert!(matches!(err, TableError::MalformedQuotedCell { .. }));
    }

    #[test]
    fn test_end_of_data() {
        let d = Dialect::csv();
        let mut cur = Cursor::<u8>::new(&[]);
        let err = next_cell(&mut cur, &d).unwrap_err();
        assert!(matches!(err, TableError::UnexpectedEndOfData { .. }));
    }

    #[test]
    fn test_past_end_of_row() {
        let d = Dialect::csv();
        let mut cur = Cursor::new(&b"a\nb\n"[..]);
        next_cell(&mut cur, &d).unwrap();
        let err = next_cell(&mut cur, &d).unwrap_err();
        assert!(matches!(err, TableError::UnexpectedEndOfRow { .. }));
    }

    #[test]
    fn test_blank_row_has_one_empty_cell() {
        let d = Dialect::csv();
        let mut cur = Cursor::new(&b"\nx"[..]);
        let cell = next_cell(&mut cur, &d).unwrap();
        assert!(cell.is_empty());
        assert_eq!(cur.column(), 1);
    }

    #[test]
    fn test_skip_leading_whitespace() {
        let d = Dialect::csv().skip_leading_whitespace(true);
        assert_eq!(cells(b"  a,   \"b\" ,c\n", &d), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_backslash_escape() {
        let d = Dialect::csv().allow_escaped(true);
        let mut cur = Cursor::new(&b"a\\,b,c\n"[..]);
        let cell = next_cell(&mut cur, &d).unwrap();
        assert_eq!(cell.span, b"a\\,b");
        assert!(cell.escaped);
        assert_eq!(cell.text(&d).as_ref(), b"a,b");
        assert_eq!(next_cell(&mut cur, &d).unwrap().span, b"c");
    }

    #[test]
    fn test_backslash_is_literal_when_disabled() {
        let d = Dialect::csv();
        assert_eq!(cells(b"a\\,b\n", &d), vec!["a\\", "b"]);
    }

    #[test]
    fn test_cell_spans_are_sub_slices() {
        let d = Dialect::csv();
        let buf = b"xx,\"yy\"\n";
        let mut cur = Cursor::new(&buf[..]);
        let a = next_cell(&mut cur, &d).unwrap();
        let b = next_cell(&mut cur, &d).unwrap();
        assert!(std::ptr::eq(a.span.as_ptr(), buf.as_ptr()));
        assert!(std::ptr::eq(b.span.as_ptr(), buf[4..].as_ptr()));
    }

    #[test]
    fn test_wide_cells() {
        let d = Dialect::<u16>::csv();
        let buf = crate::core::chars::wide("\"a,b\",c\n");
        let mut cur = Cursor::new(&buf[..]);
        let a = next_cell(&mut cur, &d).unwrap();
        let b = next_cell(&mut cur, &d).unwrap();
        assert_eq!(String::from_utf16(a.span).unwrap(), "a,b");
        assert_eq!(String::from_utf16(b.span).unwrap(), "c");
    }
}
