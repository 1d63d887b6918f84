// texttable - Zero-copy CSV tokenizer and typed row decoder
//
// Layers:
// core:   cell and row tokenizers over a borrowed buffer of UTF-8 bytes or
//         UTF-16 units, plus the cursor and dialect they share
// schema: declared columns and their kinds
// decode: cell -> typed value conversion
// table:  header resolution, row assembly, lazy and bulk (sequential or
//         rayon-parallel) decoding
//
// Nothing is copied out of the buffer unless a column asks for an owned
// string or a custom conversion.

pub mod core;
pub mod decode;
pub mod error;
pub mod memory;
pub mod schema;
pub mod table;

pub use crate::core::{next_cell, wide, Cell, Cursor, Dialect, TextChar, NO_HEADER_ROW};
pub use decode::{Custom, FromValue, Value};
pub use error::{Position, Result, TableError};
pub use schema::{
    CellConverter, ColumnDescriptor, ColumnKind, FnConverter, IntWidth, NumberColumn, RealWidth,
    Schema,
};
pub use table::{
    parse_table, table_row_count, table_rows, FromRow, RowReader, Rows, Table, TableRecord,
};
