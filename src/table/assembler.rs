// Row assembler: build one record per row from its declared columns.

use super::resolver::Locations;
use crate::core::{next_cell, Cell, Cursor, Dialect, TextChar};
use crate::decode::{decode, FromValue, Value};
use crate::error::{Position, Result, TableError};
use crate::schema::Schema;

/// Access to the declared columns of the row under the cursor.
///
/// Columns can be requested in any order. Every cell tokenized on the way
/// to a requested column is cached, so nothing is tokenized twice.
pub struct RowReader<'r, 'a, C: TextChar = u8> {
    cursor: Cursor<'a, C>,
    locations: &'r mut Locations<'a, C>,
    schema: &'r Schema<C>,
    dialect: &'r Dialect<C>,
    next: usize,
}

impl<'r, 'a, C: TextChar> RowReader<'r, 'a, C> {
    /// `cursor` must sit at the start of a row
    pub fn new(
        cursor: Cursor<'a, C>,
        locations: &'r mut Locations<'a, C>,
        schema: &'r Schema<C>,
        dialect: &'r Dialect<C>,
    ) -> Self {
        locations.reset();
        RowReader {
            cursor,
            locations,
            schema,
            dialect,
            next: 0,
        }
    }

    /// Number of declared columns
    #[inline]
    pub fn len(&self) -> usize {
        self.schema.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }

    /// Physical row index of this row
    #[inline]
    pub fn row(&self) -> usize {
        self.cursor.row()
    }

    fn physical_index(&self, index: usize) -> Result<usize> {
        self.locations
            .get(index)
            .and_then(|location| location.physical_index)
            .ok_or_else(|| {
                TableError::schema_mismatch(format!("no declared column at index {}", index))
            })
    }

    /// Raw cell for declared column `index`
    pub fn cell(&mut self, index: usize) -> Result<Cell<'a, C>> {
        if let Some(cell) = self.locations.get(index).and_then(|l| l.cached) {
            return Ok(cell);
        }
        let physical = self.physical_index(index)?;
        while self.cursor.column() <= physical {
            let column = self.cursor.column();
            let cell = next_cell(&mut self.cursor, self.dialect)?;
            self.locations.cache(column, cell);
        }
        self.locations
            .get(index)
            .and_then(|l| l.cached)
            .ok_or(TableError::UnexpectedEndOfRow {
                at: Position::new(self.row(), physical),
            })
    }

    /// Decoded value of declared column `index`
    pub fn value(&mut self, index: usize) -> Result<Value<'a, C>> {
        let cell = self.cell(index)?;
        let physical = self.physical_index(index)?;
        let column = self.schema.get(index).ok_or_else(|| {
            TableError::schema_mismatch(format!("no declared column at index {}", index))
        })?;
        decode(
            column,
            cell,
            self.dialect,
            Position::new(self.row(), physical),
        )
    }

    pub fn get<T: FromValue<'a, C>>(&mut self, index: usize) -> Result<T> {
        T::from_value(self.value(index)?)
    }

    /// Value of the next declared column, in declaration order
    pub fn next_value<T: FromValue<'a, C>>(&mut self) -> Result<T> {
        let index = self.next;
        self.next += 1;
        self.get(index)
    }
}

/// A record type built from one row
pub trait FromRow<'a, C: TextChar = u8>: Sized {
    fn from_row(row: &mut RowReader<'_, 'a, C>) -> Result<Self>;
}

/// Touches nothing; used for counting rows.
impl<'a, C: TextChar> FromRow<'a, C> for () {
    fn from_row(_row: &mut RowReader<'_, 'a, C>) -> Result<Self> {
        Ok(())
    }
}

impl<'a, C: TextChar> FromRow<'a, C> for Vec<Value<'a, C>> {
    fn from_row(row: &mut RowReader<'_, 'a, C>) -> Result<Self> {
        (0..row.len()).map(|i| row.value(i)).collect()
    }
}

macro_rules! tuple_from_row {
    ($($t:ident),+) => {
        impl<'a, C: TextChar, $($t: FromValue<'a, C>),+> FromRow<'a, C> for ($($t,)+) {
            fn from_row(row: &mut RowReader<'_, 'a, C>) -> Result<Self> {
                Ok(($(row.next_value::<$t>()?,)+))
            }
        }
    };
}

tuple_from_row!(A);
tuple_from_row!(A, B);
tuple_from_row!(A, B, C2);
tuple_from_row!(A, B, C2, D);
tuple_from_row!(A, B, C2, D, E);
tuple_from_row!(A, B, C2, D, E, F);
tuple_from_row!(A, B, C2, D, E, F, G);
tuple_from_row!(A, B, C2, D, E, F, G, H);

/// Decode the row starting at `cursor`. The cursor is copied, so the caller
/// keeps its position.
pub fn decode_row<'a, R, C>(
    cursor: Cursor<'a, C>,
    locations: &mut Locations<'a, C>,
    schema: &Schema<C>,
    dialect: &Dialect<C>,
) -> Result<R>
where
    R: FromRow<'a, C>,
    C: TextChar,
{
    let mut reader = RowReader::new(cursor, locations, schema, dialect);
    R::from_row(&mut reader)
}
