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

//! Move tabular data between in-memory tables and Google Sheets.
//!
//! sheetpipe creates spreadsheets, writes or overwrites tabs from a
//! [`Table`], and reads tabs back into tables. The decision logic (column
//! addressing, tab-name disambiguation, overwrite planning, response
//! reconstruction) is pure and unit-testable; all network traffic goes
//! through the [`SheetService`] trait, implemented for the live API by
//! [`GoogleSheetService`].
//!
//! ```no_run
//! use serde_json::json;
//! use sheetpipe::{AuthManager, GoogleSheetService, SheetOperations, Table};
//!
//! # async fn run() -> sheetpipe::Result<()> {
//! let table = Table::from_columns(vec![
//!     ("city", vec![json!("Basel"), json!("Bern")]),
//!     ("population", vec![json!(178000), json!(134000)]),
//! ])?;
//!
//! let service = GoogleSheetService::new(AuthManager::new(None));
//! let ops = SheetOperations::new(service);
//!
//! let outcome = ops
//!     .create_spreadsheet_from_table(&table, Some("cities"), Some("Swiss cities"), true)
//!     .await?;
//! println!("created {}", outcome.spreadsheet_url);
//! # Ok(())
//! # }
//! ```
//!
//! Operations validate locally before touching the network, so validation
//! errors never leave partial remote state. Remote failures propagate
//! verbatim and multi-step overwrites are not transactional.

pub mod addressing;
pub mod auth;
pub mod error;
pub mod naming;
pub mod ops;
pub mod reconcile;
pub mod reshape;
pub mod service;
pub mod table;

pub use addressing::{RangeAddress, last_column_letter};
pub use auth::AuthManager;
pub use error::{Error, Result};
pub use naming::disambiguate_tab_name;
pub use ops::{DEFAULT_COLUMNS, DEFAULT_ROWS, SheetOperations, WriteOutcome};
pub use reconcile::{CELL_LIMIT, TabEdit, TabShape, plan_overwrite};
pub use reshape::reshape;
pub use service::{
    CreatedSpreadsheet, GoogleSheetService, SheetService, SpreadsheetMetadata, StructuralEdit,
    TabMetadata, TabSpec,
};
pub use table::{CellGrid, Column, Table, normalize};
