// Core primitives for tokenizing delimited text

pub mod cell;
pub mod chars;
pub mod cursor;
pub mod dialect;
pub mod row;

pub use cell::{next_cell, Cell};
pub use chars::{wide, TextChar};
pub use cursor::Cursor;
pub use dialect::{Dialect, NO_HEADER_ROW};
pub use row::{advance_row, count_rows, next_row, row_starts, skip_raw_row, skip_to_data, skip_to_header};
