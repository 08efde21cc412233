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

//! The narrow seam between the orchestration core and the remote
//! spreadsheet service.
//!
//! [`SheetOperations`](crate::ops::SheetOperations) only ever talks to a
//! [`SheetService`]; the pure decision logic is tested against in-memory
//! implementations while [`GoogleSheetService`](live::GoogleSheetService)
//! carries the live calls.

mod live;

pub use live::GoogleSheetService;

use crate::error::Result;
use crate::table::CellGrid;

/// Desired dimensions and title for a tab being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSpec {
    pub title: String,
    pub rows: usize,
    pub cols: usize,
}

/// Identity of a freshly created spreadsheet document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSpreadsheet {
    pub spreadsheet_id: String,
    pub spreadsheet_url: String,
}

/// Snapshot of one tab's properties, fetched per operation and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabMetadata {
    pub title: String,
    pub tab_id: i32,
    pub rows: usize,
    pub cols: usize,
}

/// Snapshot of a spreadsheet's tabs, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpreadsheetMetadata {
    pub tabs: Vec<TabMetadata>,
}

impl SpreadsheetMetadata {
    /// Finds a tab by exact title match.
    pub fn tab(&self, title: &str) -> Option<&TabMetadata> {
        self.tabs.iter().find(|tab| tab.title == title)
    }
}

/// A structural change to a spreadsheet's tabs or dimensions.
///
/// Dimension indices are 0-based and half-open, as in the Sheets
/// `DimensionRange` wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralEdit {
    DeleteRows {
        tab_id: i32,
        start_index: usize,
        end_index: usize,
    },
    DeleteColumns {
        tab_id: i32,
        start_index: usize,
        end_index: usize,
    },
    AddTab(TabSpec),
}

/// The remote spreadsheet service as the core sees it.
///
/// Implementations issue one remote call per method, propagate failures
/// verbatim as [`Error::Remote`](crate::Error::Remote), and never retry.
#[allow(async_fn_in_trait)]
pub trait SheetService {
    /// Creates a new spreadsheet document with the given tabs and returns
    /// its identity.
    async fn create_spreadsheet(
        &self,
        title: &str,
        tabs: &[TabSpec],
    ) -> Result<CreatedSpreadsheet>;

    /// Fetches the current tab metadata of a spreadsheet.
    async fn spreadsheet_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata>;

    /// Writes a grid over the given A1 range, returning the spreadsheet id
    /// echoed by the service.
    async fn write_range(&self, spreadsheet_id: &str, range: &str, grid: CellGrid)
    -> Result<String>;

    /// Clears all cell contents in the given A1 range.
    async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<()>;

    /// Applies structural edits (row/column deletion, tab addition) in one
    /// batch request.
    async fn batch_structural_edit(
        &self,
        spreadsheet_id: &str,
        edits: &[StructuralEdit],
    ) -> Result<()>;

    /// Reads the given range, returning rows of display strings. Rows may
    /// be ragged: the service omits trailing empty cells.
    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<CellGrid>;
}
