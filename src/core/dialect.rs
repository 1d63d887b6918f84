// Table dialect: structural characters and row layout.

use super::chars::TextChar;
use crate::error::{Result, TableError};

/// Sentinel accepted by [`Dialect::with_header_row`] meaning "no header".
pub const NO_HEADER_ROW: usize = usize::MAX;

/// How a buffer is laid out.
///
/// The defaults describe plain CSV: comma delimiter, double-quote quoting,
/// `\n` row terminator, header on row 0, data from row 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect<C: TextChar = u8> {
    pub delimiter: C,
    pub quote: C,
    /// Only consulted when `allow_escaped` is set
    pub escape: C,
    pub newline: C,
    /// Physical row holding column names, `None` when there is no header
    pub header_row: Option<usize>,
    /// Physical row where records begin
    pub data_row: usize,
    pub skip_leading_whitespace: bool,
    /// Treat a remainder with no delimiter left in it as end of data.
    ///
    /// Guards against a trailing blank line being read as a malformed row.
    /// Single-column tables must turn this off.
    pub require_delimiter: bool,
    /// Backslash makes the following character literal in unquoted cells
    pub allow_escaped: bool,
}

impl<C: TextChar> Dialect<C> {
    /// Comma-separated values with a header on the first row.
    pub fn csv() -> Self {
        Dialect {
            delimiter: C::COMMA,
            quote: C::QUOTE,
            escape: C::BACKSLASH,
            newline: C::NEWLINE,
            header_row: Some(0),
            data_row: 1,
            skip_leading_whitespace: false,
            require_delimiter: true,
            allow_escaped: false,
        }
    }

    /// Header on `row`; data starts on the following row.
    /// Passing [`NO_HEADER_ROW`] is the same as [`Dialect::without_header`].
    pub fn with_header_row(mut self, row: usize) -> Self {
        if row == NO_HEADER_ROW {
            return self.without_header();
        }
        self.header_row = Some(row);
        self.data_row = row + 1;
        self
    }

    /// No header; data starts on row 0 unless moved with `with_data_row`.
    pub fn without_header(mut self) -> Self {
        self.header_row = None;
        self.data_row = 0;
        self
    }

    pub fn with_data_row(mut self, row: usize) -> Self {
        self.data_row = row;
        self
    }

    pub fn with_delimiter(mut self, delimiter: C) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_quote(mut self, quote: C) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_escape(mut self, escape: C) -> Self {
        self.escape = escape;
        self.allow_escaped = true;
        self
    }

    pub fn skip_leading_whitespace(mut self, on: bool) -> Self {
        self.skip_leading_whitespace = on;
        self
    }

    pub fn require_delimiter(mut self, on: bool) -> Self {
        self.require_delimiter = on;
        self
    }

    pub fn allow_escaped(mut self, on: bool) -> Self {
        self.allow_escaped = on;
        self
    }

    #[inline]
    pub fn has_header(&self) -> bool {
        self.header_row.is_some()
    }

    /// Check the dialect is usable. Run once when a table is defined.
    pub fn validate(&self) -> Result<()> {
        if let Some(header) = self.header_row {
            if self.data_row <= header {
                return Err(TableError::invalid_dialect(format!(
                    "header row {} must precede data row {}",
                    header, self.data_row
                )));
            }
        }
        if self.delimiter == self.quote
            || self.delimiter == self.newline
            || self.quote == self.newline
        {
            return Err(TableError::invalid_dialect(
                "delimiter, quote and newline must be distinct",
            ));
        }
        if self.allow_escaped
            && (self.escape == self.delimiter
                || self.escape == self.quote
                || self.escape == self.newline)
        {
            return Err(TableError::invalid_dialect(
                "escape must differ from the structural characters",
            ));
        }
        Ok(())
    }
}

impl<C: TextChar> Default for Dialect<C> {
    fn default() -> Self {
        Self::csv()
    }
}
