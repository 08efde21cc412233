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

//! Reconstruction of a well-formed [`Table`] from a ragged read response.
//!
//! The Sheets API transmits each row only up to its last non-empty cell, so
//! a read response is rarely rectangular. This module re-synthesizes the
//! structure: short rows are padded with empty strings, body columns beyond
//! the header get placeholder names, and surplus header columns come back
//! entirely empty.

use crate::table::{Column, Table};
use serde_json::Value;

/// Prefix for column names synthesized when data rows are wider than the
/// header row.
const UNNAMED_COLUMN_PREFIX: &str = "Unnamed Sheet Col ";

/// Rebuilds a table from raw response rows, treating row 0 as the header.
///
/// Empty input yields an empty table; a lone header row yields a table with
/// those columns and zero rows. Never fails, however ragged the input.
pub fn reshape(raw_rows: &[Vec<String>]) -> Table {
    let Some((header, data_rows)) = raw_rows.split_first() else {
        return Table::new();
    };

    if data_rows.is_empty() {
        let columns = header
            .iter()
            .map(|name| Column {
                name: name.clone(),
                values: Vec::new(),
            })
            .collect();
        return Table::from_columns_unchecked(columns);
    }

    let width = data_rows.iter().map(|row| row.len()).max().unwrap_or(0);

    let mut columns: Vec<Column> = Vec::with_capacity(header.len().max(width));

    for (index, name) in header.iter().take(width).enumerate() {
        columns.push(column_from_rows(name.clone(), index, data_rows));
    }

    if header.len() > width {
        // Surplus header columns carry no data at all; they come back as
        // empty-string columns for compatibility with the historical
        // behavior, surprising as the truncation rule is.
        for name in &header[width..] {
            columns.push(Column {
                name: name.clone(),
                values: vec![Value::String(String::new()); data_rows.len()],
            });
        }
    } else {
        for index in header.len()..width {
            let name = format!("{UNNAMED_COLUMN_PREFIX}{}", index - header.len() + 1);
            columns.push(column_from_rows(name, index, data_rows));
        }
    }

    Table::from_columns_unchecked(columns)
}

fn column_from_rows(name: String, index: usize, data_rows: &[Vec<String>]) -> Column {
    Column {
        name,
        values: data_rows
            .iter()
            .map(|row| Value::String(row.get(index).cloned().unwrap_or_default()))
            .collect(),
    }
}
