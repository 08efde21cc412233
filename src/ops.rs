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

//! Orchestration of table transfers against a [`SheetService`].
//!
//! Every operation validates its arguments eagerly, so validation errors
//! never leave partial remote state behind. Remote failures, by contrast,
//! propagate verbatim with no retry and no rollback: an overwrite that
//! fails between its clear and its write leaves the tab partially
//! modified.

use crate::addressing::RangeAddress;
use crate::error::{Error, Result};
use crate::naming::disambiguate_tab_name;
use crate::reconcile::{CELL_LIMIT, TabEdit, TabShape, plan_overwrite};
use crate::reshape::reshape;
use crate::service::{CreatedSpreadsheet, SheetService, StructuralEdit, TabSpec};
use crate::table::{CellGrid, Table, normalize};
use tracing::{debug, info};

pub const DEFAULT_DOCUMENT_NAME: &str = "Untitled spreadsheet";
pub const DEFAULT_TAB_NAME: &str = "Sheet1";

/// Default footprint of a freshly created tab.
pub const DEFAULT_COLUMNS: usize = 26;
pub const DEFAULT_ROWS: usize = 1000;

/// Result of a successful write operation. Failure is conveyed through
/// [`Error`], so reaching this value means the write landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub spreadsheet_id: String,
    pub spreadsheet_url: String,
}

fn document_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}")
}

fn require(value: &str, name: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::MissingArgument(name));
    }
    Ok(())
}

/// Table transfer operations against a remote spreadsheet service.
///
/// The service handle is passed in explicitly by the caller; there is no
/// process-wide singleton. Operations issue their remote calls
/// sequentially and cannot be aborted mid-sequence.
pub struct SheetOperations<S> {
    service: S,
}

impl<S: SheetService> SheetOperations<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Creates an empty spreadsheet and returns its id and URL.
    ///
    /// # Arguments
    ///
    /// * `document_name` - Spreadsheet title, defaults to "Untitled spreadsheet"
    /// * `sheet_name` - First tab title, defaults to "Sheet1"
    /// * `cols`, `rows` - Dimensions of the first tab
    pub async fn create_empty_spreadsheet(
        &self,
        document_name: Option<&str>,
        sheet_name: Option<&str>,
        cols: usize,
        rows: usize,
    ) -> Result<CreatedSpreadsheet> {
        let document_name = document_name.unwrap_or(DEFAULT_DOCUMENT_NAME);
        let sheet_name = sheet_name.unwrap_or(DEFAULT_TAB_NAME);

        info!("📊 Creating empty spreadsheet '{}'", document_name);

        let tab = TabSpec {
            title: sheet_name.to_string(),
            rows,
            cols,
        };
        self.service
            .create_spreadsheet(document_name, std::slice::from_ref(&tab))
            .await
    }

    /// Creates a new spreadsheet and pastes the table into its first tab.
    ///
    /// The new tab gets the default 26 × 1000 footprint unless that many
    /// default columns against the table's rows would break the cell
    /// limit, in which case the tab is sized exactly to the grid.
    ///
    /// # Errors
    ///
    /// * `EmptyTable` if the table has no data rows
    /// * `CapacityExceeded` if the grid is over 2,000,000 cells
    /// * `ColumnOutOfRange` if the table is wider than column "ZZ"
    pub async fn create_spreadsheet_from_table(
        &self,
        table: &Table,
        sheet_name: Option<&str>,
        document_name: Option<&str>,
        include_header: bool,
    ) -> Result<WriteOutcome> {
        let sheet_name = sheet_name.unwrap_or(DEFAULT_TAB_NAME);

        let normalized = normalize(table)?;
        let grid = normalized.to_grid(include_header);
        let shape = grid_shape(&grid);

        if shape.cell_count() > CELL_LIMIT {
            return Err(Error::CapacityExceeded {
                cells: shape.cell_count(),
            });
        }

        let range = RangeAddress::whole_tab(sheet_name, shape.rows, shape.cols)?;

        // Default footprint unless it would itself exceed the cell limit.
        let (cols, rows) = if shape.rows as u64 * DEFAULT_COLUMNS as u64 > CELL_LIMIT {
            (shape.cols, shape.rows)
        } else {
            (DEFAULT_COLUMNS, DEFAULT_ROWS)
        };

        let created = self
            .create_empty_spreadsheet(document_name, Some(sheet_name), cols, rows)
            .await?;

        debug!("💾 Writing {} to new spreadsheet", range);
        let spreadsheet_id = self
            .service
            .write_range(&created.spreadsheet_id, &range.a1(), grid)
            .await?;

        info!("✅ Created spreadsheet '{}' from table", spreadsheet_id);
        Ok(WriteOutcome {
            spreadsheet_id,
            spreadsheet_url: created.spreadsheet_url,
        })
    }

    /// Overwrites an existing tab with the table, clearing and shrinking
    /// the tab as needed so no stale cells survive outside the new data's
    /// footprint.
    ///
    /// Edits are applied in plan order, one remote call each. A remote
    /// failure partway through leaves the tab partially modified; there is
    /// no automatic rollback.
    ///
    /// # Errors
    ///
    /// * `MissingArgument` if the spreadsheet id or sheet name is empty
    /// * `EmptyTable` if the table has no data rows
    /// * `CapacityExceeded` before any remote call if the grid is too large
    /// * `TabNotFound` if the named tab is absent, before any edit
    pub async fn overwrite_tab(
        &self,
        table: &Table,
        sheet_name: &str,
        spreadsheet_id: &str,
        include_header: bool,
    ) -> Result<WriteOutcome> {
        require(spreadsheet_id, "spreadsheetId")?;
        require(sheet_name, "sheet name")?;

        let normalized = normalize(table)?;
        let grid = normalized.to_grid(include_header);
        let new_shape = grid_shape(&grid);

        if new_shape.cell_count() > CELL_LIMIT {
            return Err(Error::CapacityExceeded {
                cells: new_shape.cell_count(),
            });
        }

        let metadata = self.service.spreadsheet_metadata(spreadsheet_id).await?;
        let tab = metadata.tab(sheet_name).ok_or_else(|| Error::TabNotFound {
            name: sheet_name.to_string(),
        })?;
        let tab_id = tab.tab_id;
        let current_shape = TabShape::new(tab.rows, tab.cols);

        let plan = plan_overwrite(sheet_name, new_shape, current_shape)?;
        info!(
            "🔄 Overwriting tab '{}' ({} edit(s) planned)",
            sheet_name,
            plan.len()
        );

        let mut written_id = spreadsheet_id.to_string();
        let mut grid = Some(grid);
        for edit in plan {
            match edit {
                TabEdit::Clear(range) => {
                    self.service
                        .clear_range(spreadsheet_id, &range.a1())
                        .await?;
                }
                TabEdit::DeleteColumns {
                    start_index,
                    end_index,
                } => {
                    self.service
                        .batch_structural_edit(
                            spreadsheet_id,
                            &[StructuralEdit::DeleteColumns {
                                tab_id,
                                start_index,
                                end_index,
                            }],
                        )
                        .await?;
                }
                TabEdit::DeleteRows {
                    start_index,
                    end_index,
                } => {
                    self.service
                        .batch_structural_edit(
                            spreadsheet_id,
                            &[StructuralEdit::DeleteRows {
                                tab_id,
                                start_index,
                                end_index,
                            }],
                        )
                        .await?;
                }
                TabEdit::Write(range) => {
                    let grid = grid.take().unwrap_or_default();
                    written_id = self
                        .service
                        .write_range(spreadsheet_id, &range.a1(), grid)
                        .await?;
                }
            }
        }

        info!("✅ Overwrote tab '{}' in {}", sheet_name, written_id);
        Ok(WriteOutcome {
            spreadsheet_url: document_url(&written_id),
            spreadsheet_id: written_id,
        })
    }

    /// Adds a new tab sized to the table and pastes the table into it.
    ///
    /// The tab name is disambiguated against the spreadsheet's existing
    /// tabs, so a second call with the same name creates `name_1`,
    /// `name_2`, and so on. Uniqueness is not guaranteed against tabs
    /// created concurrently by another process.
    pub async fn create_tab_from_table(
        &self,
        table: &Table,
        sheet_name: &str,
        spreadsheet_id: &str,
        include_header: bool,
    ) -> Result<WriteOutcome> {
        require(spreadsheet_id, "spreadsheetId")?;
        require(sheet_name, "sheet name")?;

        let normalized = normalize(table)?;
        let grid = normalized.to_grid(include_header);
        let shape = grid_shape(&grid);

        let metadata = self.service.spreadsheet_metadata(spreadsheet_id).await?;
        let existing: Vec<String> = metadata.tabs.iter().map(|t| t.title.clone()).collect();
        let tab_name = disambiguate_tab_name(sheet_name, &existing);

        info!("➕ Creating tab '{}' sized {}x{}", tab_name, shape.rows, shape.cols);
        self.service
            .batch_structural_edit(
                spreadsheet_id,
                &[StructuralEdit::AddTab(TabSpec {
                    title: tab_name.clone(),
                    rows: shape.rows,
                    cols: shape.cols,
                })],
            )
            .await?;

        self.overwrite_tab(table, &tab_name, spreadsheet_id, include_header)
            .await
    }

    /// Reads a tab back into a [`Table`], defaulting to the first tab when
    /// no name is given. Ragged response rows are reconstructed into a
    /// well-formed table with row 0 as the header.
    pub async fn read_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_name: Option<&str>,
    ) -> Result<Table> {
        require(spreadsheet_id, "spreadsheetId")?;

        let tab_name = match sheet_name {
            Some(name) => name.to_string(),
            None => {
                let metadata = self.service.spreadsheet_metadata(spreadsheet_id).await?;
                metadata
                    .tabs
                    .first()
                    .map(|tab| tab.title.clone())
                    .ok_or_else(|| Error::TabNotFound {
                        name: "(first tab)".to_string(),
                    })?
            }
        };

        debug!("📖 Reading tab '{}'", tab_name);
        let rows = self.service.read_range(spreadsheet_id, &tab_name).await?;
        Ok(reshape(&rows))
    }

    /// Sums `rows * cols` over every tab of the spreadsheet.
    pub async fn count_cells(&self, spreadsheet_id: &str) -> Result<u64> {
        require(spreadsheet_id, "spreadsheetId")?;

        let metadata = self.service.spreadsheet_metadata(spreadsheet_id).await?;
        Ok(metadata
            .tabs
            .iter()
            .map(|tab| tab.rows as u64 * tab.cols as u64)
            .sum())
    }

    /// Lists tab titles in document order.
    pub async fn list_tab_names(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        require(spreadsheet_id, "spreadsheetId")?;

        let metadata = self.service.spreadsheet_metadata(spreadsheet_id).await?;
        Ok(metadata.tabs.into_iter().map(|tab| tab.title).collect())
    }
}

fn grid_shape(grid: &CellGrid) -> TabShape {
    TabShape::new(
        grid.len(),
        grid.first().map(|row| row.len()).unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{SpreadsheetMetadata, TabMetadata};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// In-memory service that records every remote call in order.
    struct MockService {
        metadata: Mutex<SpreadsheetMetadata>,
        read_response: CellGrid,
        calls: Mutex<Vec<String>>,
    }

    impl MockService {
        fn new(tabs: Vec<TabMetadata>) -> Self {
            Self {
                metadata: Mutex::new(SpreadsheetMetadata { tabs }),
                read_response: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_read_response(mut self, rows: &[&[&str]]) -> Self {
            self.read_response = rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect();
            self
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SheetService for &MockService {
        async fn create_spreadsheet(
            &self,
            title: &str,
            tabs: &[TabSpec],
        ) -> Result<CreatedSpreadsheet> {
            let tab = &tabs[0];
            self.record(format!(
                "create '{}' tab '{}' {}x{}",
                title, tab.title, tab.rows, tab.cols
            ));
            Ok(CreatedSpreadsheet {
                spreadsheet_id: "new-sheet-id".to_string(),
                spreadsheet_url: "https://docs.google.com/spreadsheets/d/new-sheet-id"
                    .to_string(),
            })
        }

        async fn spreadsheet_metadata(&self, _spreadsheet_id: &str) -> Result<SpreadsheetMetadata> {
            self.record("metadata".to_string());
            Ok(self.metadata.lock().unwrap().clone())
        }

        async fn write_range(
            &self,
            spreadsheet_id: &str,
            range: &str,
            grid: CellGrid,
        ) -> Result<String> {
            self.record(format!("write {} ({} rows)", range, grid.len()));
            Ok(spreadsheet_id.to_string())
        }

        async fn clear_range(&self, _spreadsheet_id: &str, range: &str) -> Result<()> {
            self.record(format!("clear {}", range));
            Ok(())
        }

        async fn batch_structural_edit(
            &self,
            _spreadsheet_id: &str,
            edits: &[StructuralEdit],
        ) -> Result<()> {
            for edit in edits {
                match edit {
                    StructuralEdit::DeleteRows {
                        start_index,
                        end_index,
                        ..
                    } => self.record(format!("delete_rows {}..{}", start_index, end_index)),
                    StructuralEdit::DeleteColumns {
                        start_index,
                        end_index,
                        ..
                    } => self.record(format!("delete_cols {}..{}", start_index, end_index)),
                    StructuralEdit::AddTab(tab) => {
                        self.record(format!("add_tab '{}' {}x{}", tab.title, tab.rows, tab.cols));
                        self.metadata.lock().unwrap().tabs.push(TabMetadata {
                            title: tab.title.clone(),
                            tab_id: 99,
                            rows: tab.rows,
                            cols: tab.cols,
                        });
                    }
                }
            }
            Ok(())
        }

        async fn read_range(&self, _spreadsheet_id: &str, range: &str) -> Result<CellGrid> {
            self.record(format!("read {}", range));
            Ok(self.read_response.clone())
        }
    }

    fn default_tab() -> TabMetadata {
        TabMetadata {
            title: "Sheet1".to_string(),
            tab_id: 0,
            rows: 1000,
            cols: 26,
        }
    }

    fn small_table() -> Table {
        Table::from_columns(vec![
            ("a", vec![json!("1"), json!("4"), json!("7"), json!("10"), json!("13")]),
            ("b", vec![json!("2"), json!("5"), json!("8"), json!("11"), json!("14")]),
            ("c", vec![json!("3"), json!("6"), json!("9"), json!("12"), json!("15")]),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn overwrite_clears_shrinks_and_writes_in_order() {
        let mock = MockService::new(vec![default_tab()]);
        let ops = SheetOperations::new(&mock);

        // 5x3 grid into a 1000x26 tab: clear, delete trailing rows, write.
        let outcome = ops
            .overwrite_tab(&small_table(), "Sheet1", "sheet-id", false)
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                "metadata",
                "clear Sheet1!A1:Z1000",
                "delete_rows 4..1000",
                "write Sheet1!A1:C5 (5 rows)",
            ]
        );
        assert_eq!(outcome.spreadsheet_id, "sheet-id");
        assert_eq!(
            outcome.spreadsheet_url,
            "https://docs.google.com/spreadsheets/d/sheet-id"
        );
    }

    #[tokio::test]
    async fn overwrite_with_header_counts_the_header_row() {
        let mock = MockService::new(vec![default_tab()]);
        let ops = SheetOperations::new(&mock);

        ops.overwrite_tab(&small_table(), "Sheet1", "sheet-id", true)
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(calls.last().unwrap(), "write Sheet1!A1:C6 (6 rows)");
        assert!(calls.contains(&"delete_rows 5..1000".to_string()));
    }

    #[tokio::test]
    async fn overwrite_fails_fast_on_missing_arguments() {
        let mock = MockService::new(vec![default_tab()]);
        let ops = SheetOperations::new(&mock);

        let result = ops.overwrite_tab(&small_table(), "", "sheet-id", true).await;
        assert!(matches!(result, Err(Error::MissingArgument("sheet name"))));

        let result = ops.overwrite_tab(&small_table(), "Sheet1", "  ", true).await;
        assert!(matches!(result, Err(Error::MissingArgument("spreadsheetId"))));

        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn overwrite_rejects_empty_table_before_any_call() {
        let mock = MockService::new(vec![default_tab()]);
        let ops = SheetOperations::new(&mock);

        let empty = Table::from_columns(vec![("a", Vec::<Value>::new())]).unwrap();
        let result = ops.overwrite_tab(&empty, "Sheet1", "sheet-id", true).await;

        assert!(matches!(result, Err(Error::EmptyTable)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn overwrite_rejects_oversized_grid_before_any_call() {
        let mock = MockService::new(vec![default_tab()]);
        let ops = SheetOperations::new(&mock);

        // 2001 columns x 1000 rows is over the 2,000,000 cell ceiling.
        let table = Table::from_columns(
            (0..2001).map(|i| (format!("c{i}"), vec![json!(""); 1000])),
        )
        .unwrap();
        let result = ops.overwrite_tab(&table, "Sheet1", "sheet-id", false).await;

        assert!(matches!(
            result,
            Err(Error::CapacityExceeded { cells: 2_001_000 })
        ));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn overwrite_unknown_tab_stops_before_any_edit() {
        let mock = MockService::new(vec![default_tab()]);
        let ops = SheetOperations::new(&mock);

        let result = ops
            .overwrite_tab(&small_table(), "Missing", "sheet-id", true)
            .await;

        assert!(matches!(result, Err(Error::TabNotFound { .. })));
        assert_eq!(mock.calls(), vec!["metadata"]);
    }

    #[tokio::test]
    async fn create_from_table_uses_default_footprint() {
        let mock = MockService::new(vec![]);
        let ops = SheetOperations::new(&mock);

        let outcome = ops
            .create_spreadsheet_from_table(&small_table(), None, Some("Report"), true)
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                "create 'Report' tab 'Sheet1' 1000x26",
                "write Sheet1!A1:C6 (6 rows)",
            ]
        );
        assert_eq!(outcome.spreadsheet_id, "new-sheet-id");
    }

    #[tokio::test]
    async fn create_from_table_sizes_exactly_when_defaults_would_overflow() {
        let mock = MockService::new(vec![]);
        let ops = SheetOperations::new(&mock);

        // 80,000 rows x 1 col fits, but 80,000 x 26 default columns would not.
        let table =
            Table::from_columns(vec![("only", vec![json!("x"); 80_000])]).unwrap();
        ops.create_spreadsheet_from_table(&table, None, None, false)
            .await
            .unwrap();

        assert_eq!(
            mock.calls()[0],
            "create 'Untitled spreadsheet' tab 'Sheet1' 80000x1"
        );
    }

    #[tokio::test]
    async fn create_tab_disambiguates_then_overwrites() {
        let mock = MockService::new(vec![default_tab()]);
        let ops = SheetOperations::new(&mock);

        ops.create_tab_from_table(&small_table(), "Sheet1", "sheet-id", false)
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                "metadata",
                "add_tab 'Sheet1_1' 5x3",
                "metadata",
                "clear Sheet1_1!A1:C5",
                "write Sheet1_1!A1:C5 (5 rows)",
            ]
        );
    }

    #[tokio::test]
    async fn read_sheet_defaults_to_first_tab() {
        let mock = MockService::new(vec![default_tab()])
            .with_read_response(&[&["A", "B"], &["1", "2", "3"]]);
        let ops = SheetOperations::new(&mock);

        let table = ops.read_sheet("sheet-id", None).await.unwrap();

        assert_eq!(mock.calls(), vec!["metadata", "read Sheet1"]);
        assert_eq!(table.column_names(), vec!["A", "B", "Unnamed Sheet Col 1"]);
        assert_eq!(table.row_count(), 1);
    }

    #[tokio::test]
    async fn read_sheet_uses_named_tab_without_metadata_lookup() {
        let mock = MockService::new(vec![default_tab()])
            .with_read_response(&[&["A"], &["1"]]);
        let ops = SheetOperations::new(&mock);

        let table = ops.read_sheet("sheet-id", Some("Other")).await.unwrap();

        assert_eq!(mock.calls(), vec!["read Other"]);
        assert_eq!(table.column_names(), vec!["A"]);
    }

    #[tokio::test]
    async fn read_sheet_with_no_tabs_reports_tab_not_found() {
        let mock = MockService::new(vec![]);
        let ops = SheetOperations::new(&mock);

        let result = ops.read_sheet("sheet-id", None).await;
        assert!(matches!(result, Err(Error::TabNotFound { .. })));
    }

    #[tokio::test]
    async fn count_cells_sums_all_tabs() {
        let mock = MockService::new(vec![
            default_tab(),
            TabMetadata {
                title: "Extra".to_string(),
                tab_id: 1,
                rows: 10,
                cols: 4,
            },
        ]);
        let ops = SheetOperations::new(&mock);

        assert_eq!(ops.count_cells("sheet-id").await.unwrap(), 26_040);
    }

    #[tokio::test]
    async fn list_tab_names_preserves_document_order() {
        let mock = MockService::new(vec![
            TabMetadata {
                title: "second".to_string(),
                tab_id: 7,
                rows: 1,
                cols: 1,
            },
            default_tab(),
        ]);
        let ops = SheetOperations::new(&mock);

        assert_eq!(
            ops.list_tab_names("sheet-id").await.unwrap(),
            vec!["second", "Sheet1"]
        );
    }

    #[tokio::test]
    async fn create_empty_applies_provided_names_and_dimensions() {
        let mock = MockService::new(vec![]);
        let ops = SheetOperations::new(&mock);

        let created = ops
            .create_empty_spreadsheet(Some("Budget"), Some("Totals"), 8, 50)
            .await
            .unwrap();

        assert_eq!(mock.calls(), vec!["create 'Budget' tab 'Totals' 50x8"]);
        assert_eq!(created.spreadsheet_id, "new-sheet-id");
    }
}
