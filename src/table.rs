// Copyright 2025 Webmobix Solutions AG
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUTHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory table model and cell normalization.
//!
//! A [`Table`] is an ordered sequence of named columns of JSON cells. The
//! normalizer turns every cell into a display string so a table can travel
//! to Google Sheets as a rectangular grid of text.

use crate::error::{Error, Result};
use serde_json::Value;

/// A rectangular, row-major grid of string cells ready for transmission.
pub type CellGrid = Vec<Vec<String>>;

/// A named column of cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// An ordered collection of equally-sized named columns.
///
/// Column names are not required to be unique, but downstream tab naming
/// assumes callers intend them to be.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Creates an empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from columns, validating that every column has the
    /// same number of rows.
    ///
    /// # Errors
    ///
    /// * `ColumnLengthMismatch` if any column differs in length from the first
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column {
                name: name.into(),
                values,
            })
            .collect();

        if let Some(first) = columns.first() {
            let expected = first.values.len();
            for column in &columns {
                if column.values.len() != expected {
                    return Err(Error::ColumnLengthMismatch {
                        column: column.name.clone(),
                        expected,
                        actual: column.values.len(),
                    });
                }
            }
        }

        Ok(Self { columns })
    }

    /// Internal constructor for columns already known to be equal length.
    pub(crate) fn from_columns_unchecked(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns
                .windows(2)
                .all(|pair| pair[0].values.len() == pair[1].values.len())
        );
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Ordered column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows (the header is not a row).
    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    /// A table with no data rows is considered empty even if it has columns.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Serializes the table into a row-major grid of display strings,
    /// optionally prepending the column names as a header row.
    pub fn to_grid(&self, include_header: bool) -> CellGrid {
        let mut grid = Vec::with_capacity(self.row_count() + usize::from(include_header));

        if include_header {
            grid.push(self.columns.iter().map(|c| c.name.clone()).collect());
        }

        for row in 0..self.row_count() {
            grid.push(
                self.columns
                    .iter()
                    .map(|c| cell_to_string(&c.values[row]))
                    .collect(),
            );
        }

        grid
    }
}

/// Converts a single JSON cell into its display string.
///
/// Nulls become the empty string; strings pass through verbatim; numbers
/// and booleans use their canonical text form; nested values fall back to
/// compact JSON. Total over all representable values.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(num) => num.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Returns a copy of `table` with every cell converted to a display string.
///
/// The input is never mutated. Normalization is idempotent: string cells
/// pass through unchanged.
///
/// # Errors
///
/// * `EmptyTable` if the table has zero data rows
pub fn normalize(table: &Table) -> Result<Table> {
    if table.is_empty() {
        return Err(Error::EmptyTable);
    }

    let columns = table
        .columns
        .iter()
        .map(|column| Column {
            name: column.name.clone(),
            values: column
                .values
                .iter()
                .map(|value| Value::String(cell_to_string(value)))
                .collect(),
        })
        .collect();

    Ok(Table::from_columns_unchecked(columns))
}
