// Column resolver: map declared columns to physical columns via the header.

use crate::core::{next_cell, skip_to_data, skip_to_header, Cell, Cursor, Dialect, TextChar};
use crate::error::{Result, TableError};
use crate::schema::Schema;

/// Runtime location of one declared column, plus the per-row cell cache.
#[derive(Debug, Clone, Copy)]
pub struct ColumnLocation<'a, C: TextChar = u8> {
    pub physical_index: Option<usize>,
    /// Cell seen for this column in the current row, if any
    pub cached: Option<Cell<'a, C>>,
}

/// One location per declared column, indexed by declared position.
/// Allocated once per session and reset at the start of every row.
#[derive(Debug, Clone)]
pub struct Locations<'a, C: TextChar = u8> {
    columns: Vec<ColumnLocation<'a, C>>,
}

impl<'a, C: TextChar> Locations<'a, C> {
    /// Unnamed columns sit at their explicit position or their declared
    /// index; named ones are unknown until the header is read.
    pub fn for_schema(schema: &Schema<C>) -> Self {
        let columns = schema
            .iter()
            .enumerate()
            .map(|(i, column)| ColumnLocation {
                physical_index: match column.name {
                    Some(_) => None,
                    None => Some(column.position.unwrap_or(i)),
                },
                cached: None,
            })
            .collect();
        Locations { columns }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ColumnLocation<'a, C>> {
        self.columns.get(index)
    }

    /// Invalidate every cached cell
    #[inline]
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.cached = None;
        }
    }

    /// Cache `cell` for every declared column living at `physical`
    #[inline]
    pub fn cache(&mut self, physical: usize, cell: Cell<'a, C>) {
        for column in &mut self.columns {
            if column.physical_index == Some(physical) && column.cached.is_none() {
                column.cached = Some(cell);
            }
        }
    }
}

/// Resolve declared columns against the header and leave the cursor on the
/// first data row. Runs once per session.
pub fn resolve<'a, C: TextChar>(
    cursor: &mut Cursor<'a, C>,
    schema: &Schema<C>,
    dialect: &Dialect<C>,
) -> Result<Locations<'a, C>> {
    let mut locations = Locations::for_schema(schema);
    let named = schema.named_count();

    skip_to_header(cursor, dialect);

    if named > 0 {
        if !dialect.has_header() {
            return Err(TableError::schema_mismatch(
                "named columns require a header row",
            ));
        }
        if cursor.at_eol(dialect) {
            return Err(TableError::schema_mismatch("expected column headers"));
        }

        let mut found = 0;
        while found < named && !cursor.at_eol(dialect) {
            let physical = cursor.column();
            let cell = next_cell(cursor, dialect)?;
            let text = cell.text(dialect);
            let Some(name) = C::to_text(&text) else {
                continue;
            };
            for (column, location) in schema.iter().zip(locations.columns.iter_mut()) {
                if location.physical_index.is_none() && column.name.as_deref() == Some(&*name) {
                    location.physical_index = Some(physical);
                    log::trace!("{} column {:?} at physical {}", column.kind.name(), &*name, physical);
                    found += 1;
                }
            }
        }

        if found < named {
            let missing: Vec<String> = schema
                .iter()
                .zip(locations.columns.iter())
                .filter(|(_, location)| location.physical_index.is_none())
                .filter_map(|(column, _)| {
                    let name = column.name.as_deref()?;
                    Some(format!("{} ({})", name, column.kind.name()))
                })
                .collect();
            return Err(TableError::schema_mismatch(format!(
                "columns missing from header: {}",
                missing.join(", ")
            )));
        }
        log::debug!("resolved {} named columns from header", named);
    }

    skip_to_data(cursor, dialect)?;
    Ok(locations)
}
