// Table sessions: resolve a schema against a buffer and decode its rows.

pub mod assembler;
pub mod parallel;
pub mod resolver;
pub mod rows;

pub use assembler::{decode_row, FromRow, RowReader};
pub use resolver::{resolve, ColumnLocation, Locations};
pub use rows::Rows;

use crate::core::{count_rows, next_row, Cursor, Dialect, TextChar};
use crate::error::{Result, TableError};
use crate::schema::Schema;
use std::sync::Arc;

/// A record type with a fixed schema and dialect.
///
/// ```
/// use texttable::{ColumnDescriptor, Schema, TableRecord};
///
/// struct Entry;
///
/// impl<'a> texttable::FromRow<'a> for Entry {
///     fn from_row(_row: &mut texttable::RowReader<'_, 'a>) -> texttable::Result<Self> {
///         Ok(Entry)
///     }
/// }
///
/// impl<'a> TableRecord<'a> for Entry {
///     fn schema() -> Schema {
///         Schema::new().column(ColumnDescriptor::raw("id"))
///     }
/// }
///
/// assert_eq!(texttable::table_row_count::<Entry, u8>(b"id,x\n1,a\n2,b\n").unwrap(), 2);
/// ```
pub trait TableRecord<'a, C: TextChar = u8>: FromRow<'a, C> {
    fn schema() -> Schema<C>;

    fn dialect() -> Dialect<C> {
        Dialect::csv()
    }
}

/// A validated schema and dialect pair. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Table<C: TextChar = u8> {
    schema: Arc<Schema<C>>,
    dialect: Dialect<C>,
}

impl<C: TextChar> Table<C> {
    pub fn new(schema: Schema<C>, dialect: Dialect<C>) -> Result<Self> {
        dialect.validate()?;
        if schema.named_count() > 0 && !dialect.has_header() {
            return Err(TableError::schema_mismatch(
                "named columns require a header row",
            ));
        }
        Ok(Table {
            schema: Arc::new(schema),
            dialect,
        })
    }

    /// Table for a [`TableRecord`] type
    pub fn for_record<'a, R: TableRecord<'a, C>>() -> Result<Self> {
        Self::new(R::schema(), R::dialect())
    }

    #[inline]
    pub fn schema(&self) -> &Schema<C> {
        &self.schema
    }

    #[inline]
    pub fn dialect(&self) -> &Dialect<C> {
        &self.dialect
    }

    /// Lazy iterator over the data rows of `buffer`. The header is resolved
    /// here, once.
    pub fn rows<'a, R: FromRow<'a, C>>(&self, buffer: &'a [C]) -> Result<Rows<'a, R, C>> {
        let mut cursor = Cursor::new(buffer);
        let locations = resolve(&mut cursor, &self.schema, &self.dialect)?;
        Ok(Rows::positioned(self.clone(), cursor, locations))
    }

    /// Decode every data row, in order
    pub fn parse<'a, R: FromRow<'a, C>>(&self, buffer: &'a [C]) -> Result<Vec<R>> {
        let mut records = Vec::new();
        self.parse_into(buffer, &mut records)?;
        Ok(records)
    }

    /// Decode every data row into `out`, returning how many were added.
    /// Stops at the first error; rows decoded before it stay in `out`.
    pub fn parse_into<'a, R, E>(&self, buffer: &'a [C], out: &mut E) -> Result<usize>
    where
        R: FromRow<'a, C>,
        E: Extend<R>,
    {
        let mut cursor = Cursor::new(buffer);
        let mut locations = resolve(&mut cursor, &self.schema, &self.dialect)?;
        let mut count = 0;
        while !cursor.at_eof() {
            let record = decode_row(cursor, &mut locations, &self.schema, &self.dialect)?;
            out.extend(std::iter::once(record));
            next_row(&mut cursor, &self.dialect);
            count += 1;
        }
        log::debug!("decoded {} rows", count);
        Ok(count)
    }

    /// Number of data rows. Only row boundaries are scanned; no cell is
    /// decoded.
    pub fn row_count(&self, buffer: &[C]) -> Result<usize> {
        let mut cursor = Cursor::new(buffer);
        resolve(&mut cursor, &self.schema, &self.dialect)?;
        Ok(count_rows(cursor, &self.dialect))
    }

    /// Like [`Table::parse`], decoding rows on the rayon pool
    pub fn parse_parallel<'a, R>(&self, buffer: &'a [C]) -> Result<Vec<R>>
    where
        R: FromRow<'a, C> + Send,
    {
        parallel::parse_parallel(self, buffer)
    }
}

/// Parse every row of `buffer` as `R` using its own schema and dialect
pub fn parse_table<'a, R, C>(buffer: &'a [C]) -> Result<Vec<R>>
where
    R: TableRecord<'a, C>,
    C: TextChar,
{
    Table::for_record::<R>()?.parse(buffer)
}

/// Lazy rows of `buffer` as `R`
pub fn table_rows<'a, R, C>(buffer: &'a [C]) -> Result<Rows<'a, R, C>>
where
    R: TableRecord<'a, C>,
    C: TextChar,
{
    Table::for_record::<R>()?.rows(buffer)
}

/// Data row count of `buffer` under the layout of `R`
pub fn table_row_count<'a, R, C>(buffer: &[C]) -> Result<usize>
where
    R: TableRecord<'a, C>,
    C: TextChar,
{
    Table::for_record::<R>()?.row_count(buffer)
}
