// Error type shared by the tokenizer, resolver and decoders
//
// Every failure is terminal for the parse session that produced it; there is
// no per-row skip or retry.

use std::fmt;
use thiserror::Error;

/// Location of a cell inside the buffer: physical row and physical column,
/// both 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Position { row, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column {}", self.row, self.column)
    }
}

/// Errors produced while tokenizing or decoding a table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// The tokenizer was asked for a cell with nothing left in the buffer
    #[error("unexpected end of data at {at}")]
    UnexpectedEndOfData { at: Position },

    /// A declared column lies past the last cell of the row
    #[error("unexpected end of row at {at}")]
    UnexpectedEndOfRow { at: Position },

    /// A quoted cell never found its closing quote
    #[error("malformed quoted cell at {at}: missing closing quote")]
    MalformedQuotedCell { at: Position },

    /// Something other than a delimiter or newline followed a closing quote
    #[error("malformed row at {at}: expected next column or new row")]
    MalformedRow { at: Position },

    /// A named column is absent from the header, or a header is required
    /// but missing
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Real-number text could not be parsed
    #[error("invalid number at {at}")]
    InvalidNumber { at: Position },

    /// Real-number text parsed to a magnitude the target cannot hold
    #[error("number out of range at {at}")]
    NumberOutOfRange { at: Position },

    /// Integer does not fit the declared width (range checking enabled)
    #[error("numeric overflow at {at}: value does not fit {target}")]
    NumericOverflow { at: Position, target: &'static str },

    /// The cell is not valid text for a string target
    #[error("invalid text at {at}")]
    InvalidText { at: Position },

    /// A record asked a column for a Rust type its kind cannot produce
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A custom converter rejected the cell
    #[error("conversion failed: {message}")]
    Conversion { message: String },

    /// The dialect settings contradict each other
    #[error("invalid dialect: {message}")]
    InvalidDialect { message: String },
}

impl TableError {
    /// Create a schema mismatch error
    pub fn schema_mismatch<S: Into<String>>(message: S) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create a custom conversion error
    pub fn conversion<S: Into<String>>(message: S) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Create an invalid dialect error
    pub fn invalid_dialect<S: Into<String>>(message: S) -> Self {
        Self::InvalidDialect {
            message: message.into(),
        }
    }

    /// Position of the offending cell, when the error is tied to one
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::UnexpectedEndOfData { at }
            | Self::UnexpectedEndOfRow { at }
            | Self::MalformedQuotedCell { at }
            | Self::MalformedRow { at }
            | Self::InvalidNumber { at }
            | Self::NumberOutOfRange { at }
            | Self::NumericOverflow { at, .. }
            | Self::InvalidText { at } => Some(*at),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let err = TableError::MalformedQuotedCell {
            at: Position::new(3, 1),
        };
        assert_eq!(
            err.to_string(),
            "malformed quoted cell at row 3, column 1: missing closing quote"
        );
        assert_eq!(err.position(), Some(Position::new(3, 1)));
    }

    #[test]
    fn test_helpers() {
        let err = TableError::schema_mismatch("missing column \"a\"");
        assert_eq!(err.to_string(), "schema mismatch: missing column \"a\"");
        assert_eq!(err.position(), None);
    }
}
