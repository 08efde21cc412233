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

//! Spreadsheet column-letter addressing and A1-notation ranges.

use crate::error::{Error, Result};
use std::fmt;

/// Highest addressable column, i.e. "ZZ".
pub const MAX_COLUMNS: usize = 702;

fn letter(position: usize) -> char {
    debug_assert!((1..=26).contains(&position));
    (b'A' + (position - 1) as u8) as char
}

/// Returns the column letter for a 1-indexed column count (1→"A", 26→"Z",
/// 27→"AA", 702→"ZZ") using bijective base-26 addressing.
///
/// # Errors
///
/// * `ColumnOutOfRange` if the count is zero or past column "ZZ" (702)
pub fn last_column_letter(column_count: usize) -> Result<String> {
    if column_count == 0 || column_count > MAX_COLUMNS {
        return Err(Error::ColumnOutOfRange {
            columns: column_count,
        });
    }

    if column_count <= 26 {
        return Ok(letter(column_count).to_string());
    }

    // Exact multiples of 26 land on a trailing "Z" rather than rolling the
    // first letter forward.
    let (first, second) = if column_count % 26 == 0 {
        (letter(column_count / 26 - 1), 'Z')
    } else {
        (letter(column_count / 26), letter(column_count % 26))
    };

    Ok(format!("{first}{second}"))
}

/// A whole-tab rectangular span in A1 notation, e.g. `Sheet1!A1:C5`.
///
/// The top-left corner is always A1; partial offsets are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAddress {
    tab: String,
    last_column: String,
    last_row: usize,
}

impl RangeAddress {
    /// Addresses the full extent of a tab with the given dimensions.
    ///
    /// # Errors
    ///
    /// * `ColumnOutOfRange` if `columns` cannot be expressed as a letter code
    pub fn whole_tab(tab: &str, rows: usize, columns: usize) -> Result<Self> {
        Ok(Self {
            tab: tab.to_string(),
            last_column: last_column_letter(columns)?,
            last_row: rows,
        })
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }

    /// The range in `Tab!A1:<col><row>` notation, as sent to the API.
    pub fn a1(&self) -> String {
        format!("{}!A1:{}{}", self.tab, self.last_column, self.last_row)
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.a1())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_letter_columns() {
        for (count, expected) in (1..=26).zip('A'..='Z') {
            assert_eq!(last_column_letter(count).unwrap(), expected.to_string());
        }
    }

    #[test]
    fn two_letter_columns() {
        assert_eq!(last_column_letter(27).unwrap(), "AA");
        assert_eq!(last_column_letter(52).unwrap(), "AZ");
        assert_eq!(last_column_letter(53).unwrap(), "BA");
        assert_eq!(last_column_letter(78).unwrap(), "BZ");
        assert_eq!(last_column_letter(701).unwrap(), "ZY");
        assert_eq!(last_column_letter(702).unwrap(), "ZZ");
    }

    #[test]
    fn rejects_columns_past_zz() {
        assert!(matches!(
            last_column_letter(703),
            Err(Error::ColumnOutOfRange { columns: 703 })
        ));
        assert!(matches!(
            last_column_letter(0),
            Err(Error::ColumnOutOfRange { columns: 0 })
        ));
    }

    #[test]
    fn whole_tab_range_formats_as_a1_notation() {
        let range = RangeAddress::whole_tab("Sheet1", 1000, 26).unwrap();
        assert_eq!(range.a1(), "Sheet1!A1:Z1000");
        assert_eq!(range.to_string(), "Sheet1!A1:Z1000");

        let range = RangeAddress::whole_tab("data", 5, 3).unwrap();
        assert_eq!(range.a1(), "data!A1:C5");
    }
}
