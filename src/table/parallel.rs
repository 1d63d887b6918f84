// Parallel bulk decoding using Rayon
//
// 1. Single-threaded: resolve the header and find every row start
//    (quote-aware, so it must be sequential)
// 2. Parallel: decode each row independently, one location table per worker

use super::assembler::{decode_row, FromRow};
use super::resolver::resolve;
use super::Table;
use crate::core::{row_starts, Cursor, TextChar};
use crate::error::Result;
use rayon::prelude::*;

/// Decode every data row on the rayon pool. Output order matches input
/// order. When rows fail, the error of the earliest failing row is returned.
pub fn parse_parallel<'a, R, C>(table: &Table<C>, buffer: &'a [C]) -> Result<Vec<R>>
where
    R: FromRow<'a, C> + Send,
    C: TextChar,
{
    let schema = table.schema();
    let dialect = table.dialect();

    // Phase 1: header and row boundaries
    let mut cursor = Cursor::new(buffer);
    let locations = resolve(&mut cursor, schema, dialect)?;
    let starts = row_starts(cursor, dialect);

    if starts.is_empty() {
        return Ok(Vec::new());
    }

    // Phase 2: decode rows in parallel. Per-row results keep input order,
    // so the sequential collect below stops at the earliest failing row.
    let decoded: Vec<Result<R>> = starts
        .into_par_iter()
        .map_init(
            || locations.clone(),
            |locations, (view, row)| decode_row(Cursor::at_row(view, row), locations, schema, dialect),
        )
        .collect();
    let records = decoded.into_iter().collect::<Result<Vec<R>>>()?;

    log::debug!("decoded {} rows in parallel", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDescriptor, Schema};
    use crate::Dialect;

    #[test]
    fn test_matches_sequential() {
        let table = Table::new(
            Schema::new()
                .column(ColumnDescriptor::string("name"))
                .column(ColumnDescriptor::number::<i64>("n")),
            Dialect::csv(),
        )
        .unwrap();
        let mut buf = String::from("n,name\n");
        for i in 0..500 {
            buf.push_str(&format!("{},\"row \"\"{}\"\"\nsecond line\"\n", i - 250, i));
        }
        let parallel: Vec<(String, i64)> = parse_parallel(&table, buf.as_bytes()).unwrap();
        let sequential: Vec<(String, i64)> = table.parse(buf.as_bytes()).unwrap();
        assert_eq!(parallel.len(), 500);
        assert_eq!(parallel, sequential);
        assert_eq!(parallel[3], ("row \"3\"\nsecond line".to_string(), -247));
    }

    #[test]
    fn test_first_error_aborts() {
        let table = Table::new(
            Schema::new().column(ColumnDescriptor::number::<u8>("n").with_range_check()),
            Dialect::csv().require_delimiter(false),
        )
        .unwrap();
        let result: Result<Vec<(u8,)>> = parse_parallel(&table, b"n\n1\n2\n300\n4\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_earliest_bad_row_is_reported() {
        let table = Table::new(
            Schema::new().column(ColumnDescriptor::number::<u8>("n").with_range_check()),
            Dialect::csv().require_delimiter(false),
        )
        .unwrap();
        let mut buf = String::from("n\n");
        for i in 0..2000 {
            buf.push_str(if i % 500 == 137 { "999\n" } else { "7\n" });
        }
        // Data row 137 sits on physical row 138, after the header
        for _ in 0..8 {
            let err = parse_parallel::<(u8,), u8>(&table, buf.as_bytes()).unwrap_err();
            assert!(matches!(err, crate::TableError::NumericOverflow { .. }));
            assert_eq!(err.position(), Some(crate::Position::new(138, 0)));
        }
    }

    #[test]
    fn test_empty_body() {
        let table = Table::new(
            Schema::new().column(ColumnDescriptor::raw("a")),
            Dialect::csv(),
        )
        .unwrap();
        let rows: Vec<(&str,)> = parse_parallel(&table, b"a,b\n").unwrap();
        assert!(rows.is_empty());
    }
}
