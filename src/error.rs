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

use thiserror::Error;

/// Errors surfaced by sheetpipe operations.
///
/// Validation variants are raised locally before any remote call is made;
/// only `Remote` can occur after a mutation has already been issued.
#[derive(Error, Debug)]
pub enum Error {
    #[error("the table has no data rows; please pass in a table with data")]
    EmptyTable,

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("{cells} cells exceed the Google Sheets limit of 2,000,000 per document")]
    CapacityExceeded { cells: u64 },

    #[error("{columns} columns cannot be addressed; the last supported column is 'ZZ' (702)")]
    ColumnOutOfRange { columns: usize },

    #[error("unable to find tab '{name}' in the spreadsheet; please check the sheet name")]
    TabNotFound { name: String },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Google Sheets API error: {0}")]
    Remote(String),
}

impl Error {
    /// Wraps a Sheets API failure without retrying or interpreting it.
    pub(crate) fn remote(err: google_sheets4::Error) -> Self {
        Error::Remote(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
