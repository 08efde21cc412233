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

//! Overwrite planning: the structural edits needed to fit new data into an
//! existing tab.
//!
//! Written ranges do not shrink a tab, so overwriting a large tab with a
//! smaller grid would leave stale trailing rows and columns behind. The
//! planner emits an ordered list of edits (clear, shrink, write) that the
//! orchestrator replays against the Sheet Service, one remote call each.
//! The plan itself is pure: it only looks at the two shapes.

use crate::addressing::RangeAddress;
use crate::error::{Error, Result};

/// Maximum number of cells Google Sheets permits per document.
pub const CELL_LIMIT: u64 = 2_000_000;

/// Row/column extent of a grid or an existing tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabShape {
    pub rows: usize,
    pub cols: usize,
}

impl TabShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn cell_count(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }
}

/// One step of an overwrite plan, applied in order.
///
/// Dimension indices are 0-based and half-open, matching the wire format of
/// the Sheets `DimensionRange`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEdit {
    /// Clear all prior cell contents over the full current extent.
    Clear(RangeAddress),
    /// Remove a span of columns.
    DeleteColumns { start_index: usize, end_index: usize },
    /// Remove a span of rows.
    DeleteRows { start_index: usize, end_index: usize },
    /// Write the new grid over its full extent.
    Write(RangeAddress),
}

/// Computes the ordered edits that prepare `current` to receive a grid of
/// shape `new`, ending with the write itself.
///
/// The plan always starts by clearing the tab's current extent. Columns are
/// shrunk only when the new row count against the current width would break
/// the cell limit; the shrink keeps the first column and deletes columns 2
/// through `current.cols - 1`, tolerating over-deletion because the final
/// write re-establishes every column it needs. Rows are shrunk whenever the
/// new grid is shorter than the tab.
///
/// # Errors
///
/// * `CapacityExceeded` if the new grid itself is over [`CELL_LIMIT`]
///   (checked before anything else, so no edit is ever emitted for it)
/// * `ColumnOutOfRange` if either shape is wider than column "ZZ"
pub fn plan_overwrite(tab: &str, new: TabShape, current: TabShape) -> Result<Vec<TabEdit>> {
    if new.cell_count() > CELL_LIMIT {
        return Err(Error::CapacityExceeded {
            cells: new.cell_count(),
        });
    }

    let mut edits = Vec::with_capacity(4);

    edits.push(TabEdit::Clear(RangeAddress::whole_tab(
        tab,
        current.rows,
        current.cols,
    )?));

    if new.rows as u64 * current.cols as u64 > CELL_LIMIT {
        edits.push(TabEdit::DeleteColumns {
            start_index: 1,
            end_index: current.cols - 1,
        });
    }

    if new.rows < current.rows {
        edits.push(TabEdit::DeleteRows {
            start_index: new.rows.saturating_sub(1),
            end_index: current.rows,
        });
    }

    edits.push(TabEdit::Write(RangeAddress::whole_tab(
        tab, new.rows, new.cols,
    )?));

    Ok(edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_capacity_grid_fails_with_no_edits() {
        let result = plan_overwrite("Sheet1", TabShape::new(1000, 2001), TabShape::new(10, 10));
        assert!(matches!(
            result,
            Err(Error::CapacityExceeded { cells: 2_001_000 })
        ));
    }

    #[test]
    fn smaller_grid_clears_shrinks_rows_then_writes() {
        let edits =
            plan_overwrite("Sheet1", TabShape::new(5, 3), TabShape::new(1000, 26)).unwrap();

        assert_eq!(
            edits,
            vec![
                TabEdit::Clear(RangeAddress::whole_tab("Sheet1", 1000, 26).unwrap()),
                TabEdit::DeleteRows {
                    start_index: 4,
                    end_index: 1000,
                },
                TabEdit::Write(RangeAddress::whole_tab("Sheet1", 5, 3).unwrap()),
            ]
        );
    }

    #[test]
    fn equal_or_larger_grid_only_clears_and_writes() {
        let edits = plan_overwrite("Sheet1", TabShape::new(1000, 26), TabShape::new(1000, 26))
            .unwrap();
        assert_eq!(edits.len(), 2);
        assert!(matches!(edits[0], TabEdit::Clear(_)));
        assert!(matches!(edits[1], TabEdit::Write(_)));

        let edits =
            plan_overwrite("Sheet1", TabShape::new(2000, 26), TabShape::new(1000, 26)).unwrap();
        assert_eq!(edits.len(), 2);
    }

    #[test]
    fn wide_tab_triggers_defensive_column_shrink() {
        // 500_000 rows against 26 current columns breaks the limit, so the
        // planner drops columns 2..=cols-1 before the write.
        let edits =
            plan_overwrite("big", TabShape::new(500_000, 4), TabShape::new(1000, 26)).unwrap();

        assert_eq!(
            edits[1],
            TabEdit::DeleteColumns {
                start_index: 1,
                end_index: 25,
            }
        );
    }

    #[test]
    fn current_extent_past_zz_is_unaddressable() {
        let result = plan_overwrite("wide", TabShape::new(5, 3), TabShape::new(10, 703));
        assert!(matches!(result, Err(Error::ColumnOutOfRange { .. })));
    }
}
