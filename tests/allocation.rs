// Heap checks for zero-copy decoding
//
// Run: cargo test --features memory_tracking --test allocation
//
// Kept to a single test so no other test thread allocates while counting.

#![cfg(feature = "memory_tracking")]

use texttable::{memory, ColumnDescriptor, Dialect, Schema, Table};

#[test]
fn raw_columns_do_not_allocate_per_row() {
    let table = Table::new(
        Schema::new()
            .column(ColumnDescriptor::raw("s"))
            .column(ColumnDescriptor::number::<u32>("a")),
        Dialect::csv(),
    )
    .unwrap();
    let input = b"\"a\",\"s\"\n5,hello\n1,\"b\"\"ye\"\n";
    let mut rows = table.rows::<(&[u8], u32)>(input).unwrap();

    let before = memory::reset_peak().current;
    let mut total = 0;
    while let Some(row) = rows.current() {
        let (s, a) = row.unwrap();
        total += a as usize + s.len();
        rows.advance();
    }
    let after = memory::stats();

    // "b""ye" is returned raw, doubled quote included
    assert_eq!(total, 5 + 5 + 1 + 5);
    assert_eq!(after.current, before);
    assert_eq!(after.peak, before);
    assert_eq!(memory::allocated(), memory::stats().current);
}
