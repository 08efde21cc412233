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

//! Live [`SheetService`] implementation backed by the Google Sheets v4 API.

use super::{CreatedSpreadsheet, SheetService, SpreadsheetMetadata, StructuralEdit, TabMetadata, TabSpec};
use crate::auth::AuthManager;
use crate::error::{Error, Result};
use crate::table::{CellGrid, cell_to_string};
use google_sheets4::{
    Sheets,
    api::{
        AddSheetRequest, BatchUpdateSpreadsheetRequest, ClearValuesRequest,
        DeleteDimensionRequest, DimensionRange, GridProperties, Request, Sheet, SheetProperties,
        Spreadsheet, SpreadsheetProperties, ValueRange,
    },
    hyper_rustls,
};
use hyper_util::{client::legacy::connect::HttpConnector, rt::TokioExecutor};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

type SheetsHub = Sheets<hyper_rustls::HttpsConnector<HttpConnector>>;

/// The authenticated hub is rebuilt after this staleness window.
const HUB_STALE_AFTER: Duration = Duration::from_secs(30 * 60);

struct CachedHub {
    hub: SheetsHub,
    built_at: Instant,
}

/// Google Sheets v4 client with an internal refresh policy.
///
/// The hub is built lazily on first use and rebuilt once it is older than
/// thirty minutes. The cached handle lives behind a mutex, so concurrent
/// callers serialize on the refresh-or-reuse decision instead of racing it.
/// Remote failures are surfaced verbatim; nothing is retried.
pub struct GoogleSheetService {
    credentials: AuthManager,
    hub: Mutex<Option<CachedHub>>,
}

impl GoogleSheetService {
    /// Creates a service that will authenticate through `credentials` on
    /// first use. No network traffic happens here.
    pub fn new(credentials: AuthManager) -> Self {
        // Installing twice is harmless; the result only errors when another
        // provider is already registered.
        let _ = rustls::crypto::ring::default_provider().install_default();

        Self {
            credentials,
            hub: Mutex::new(None),
        }
    }

    async fn build_hub(&self) -> Result<SheetsHub> {
        info!("🔑 Initializing Google Sheets API connection...");

        let auth = self
            .credentials
            .build_authenticator()
            .await
            .map_err(|err| Error::Remote(format!("authentication failed: {err:#}")))?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|err| Error::Remote(format!("failed to load TLS roots: {err}")))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = hyper_util::client::legacy::Client::builder(TokioExecutor::new())
            .build(connector);

        info!("✅ Google Sheets API connection established");
        Ok(Sheets::new(client, auth))
    }

    /// Returns the cached hub, rebuilding it first if missing or stale.
    /// The caller holds the lock for the duration of its remote call.
    async fn fresh_hub<'a>(&self, slot: &'a mut Option<CachedHub>) -> Result<&'a SheetsHub> {
        let stale = slot
            .as_ref()
            .is_none_or(|cached| cached.built_at.elapsed() >= HUB_STALE_AFTER);

        if stale {
            if slot.is_some() {
                debug!("🔄 Cached Sheets hub is stale, rebuilding");
            }
            let hub = self.build_hub().await?;
            *slot = Some(CachedHub {
                hub,
                built_at: Instant::now(),
            });
        }

        let cached = slot
            .as_ref()
            .ok_or_else(|| Error::Remote("Sheets hub was not initialized".to_string()))?;
        Ok(&cached.hub)
    }
}

impl SheetService for GoogleSheetService {
    async fn create_spreadsheet(
        &self,
        title: &str,
        tabs: &[TabSpec],
    ) -> Result<CreatedSpreadsheet> {
        debug!("📊 Creating spreadsheet '{}' with {} tab(s)", title, tabs.len());

        let sheets = tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| Sheet {
                properties: Some(SheetProperties {
                    title: Some(tab.title.clone()),
                    index: Some(index as i32),
                    sheet_type: Some("GRID".to_string()),
                    grid_properties: Some(GridProperties {
                        row_count: Some(tab.rows as i32),
                        column_count: Some(tab.cols as i32),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect();

        let body = Spreadsheet {
            properties: Some(SpreadsheetProperties {
                title: Some(title.to_string()),
                ..Default::default()
            }),
            sheets: Some(sheets),
            ..Default::default()
        };

        let mut slot = self.hub.lock().await;
        let hub = self.fresh_hub(&mut slot).await?;

        let (_, created) = hub
            .spreadsheets()
            .create(body)
            .doit()
            .await
            .map_err(Error::remote)?;

        let spreadsheet_id = created
            .spreadsheet_id
            .ok_or_else(|| Error::Remote("create response missing spreadsheetId".to_string()))?;
        let spreadsheet_url = created
            .spreadsheet_url
            .unwrap_or_else(|| format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}"));

        info!("✅ Created spreadsheet: {}", spreadsheet_id);
        Ok(CreatedSpreadsheet {
            spreadsheet_id,
            spreadsheet_url,
        })
    }

    async fn spreadsheet_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata> {
        debug!("📋 Fetching metadata for spreadsheet: {}", spreadsheet_id);

        let mut slot = self.hub.lock().await;
        let hub = self.fresh_hub(&mut slot).await?;

        let (_, spreadsheet) = hub
            .spreadsheets()
            .get(spreadsheet_id)
            .doit()
            .await
            .map_err(Error::remote)?;

        let mut tabs = Vec::new();
        for sheet in spreadsheet.sheets.unwrap_or_default() {
            if let Some(properties) = sheet.properties
                && let Some(title) = properties.title
            {
                let grid = properties.grid_properties.unwrap_or_default();
                tabs.push(TabMetadata {
                    title,
                    tab_id: properties.sheet_id.unwrap_or(0),
                    rows: grid.row_count.unwrap_or(0).max(0) as usize,
                    cols: grid.column_count.unwrap_or(0).max(0) as usize,
                });
            }
        }

        Ok(SpreadsheetMetadata { tabs })
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        grid: CellGrid,
    ) -> Result<String> {
        debug!("💾 Writing {} row(s) to {}", grid.len(), range);

        let values = grid
            .into_iter()
            .map(|row| row.into_iter().map(Value::String).collect())
            .collect();

        let body = ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: Some(values),
            ..Default::default()
        };

        let mut slot = self.hub.lock().await;
        let hub = self.fresh_hub(&mut slot).await?;

        let (_, response) = hub
            .spreadsheets()
            .values_update(body, spreadsheet_id, range)
            .value_input_option("USER_ENTERED")
            .doit()
            .await
            .map_err(Error::remote)?;

        Ok(response
            .spreadsheet_id
            .unwrap_or_else(|| spreadsheet_id.to_string()))
    }

    async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<()> {
        debug!("🧹 Clearing range {}", range);

        let mut slot = self.hub.lock().await;
        let hub = self.fresh_hub(&mut slot).await?;

        hub.spreadsheets()
            .values_clear(ClearValuesRequest::default(), spreadsheet_id, range)
            .doit()
            .await
            .map_err(Error::remote)?;

        Ok(())
    }

    async fn batch_structural_edit(
        &self,
        spreadsheet_id: &str,
        edits: &[StructuralEdit],
    ) -> Result<()> {
        let requests: Vec<Request> = edits.iter().map(structural_request).collect();
        debug!("🛠️ Applying {} structural edit(s)", requests.len());

        let body = BatchUpdateSpreadsheetRequest {
            requests: Some(requests),
            ..Default::default()
        };

        let mut slot = self.hub.lock().await;
        let hub = self.fresh_hub(&mut slot).await?;

        hub.spreadsheets()
            .batch_update(body, spreadsheet_id)
            .doit()
            .await
            .map_err(Error::remote)?;

        Ok(())
    }

    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<CellGrid> {
        debug!("📖 Reading range {}", range);

        let mut slot = self.hub.lock().await;
        let hub = self.fresh_hub(&mut slot).await?;

        let (_, value_range) = hub
            .spreadsheets()
            .values_get(spreadsheet_id, range)
            .doit()
            .await
            .map_err(Error::remote)?;

        Ok(value_range
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }
}

fn structural_request(edit: &StructuralEdit) -> Request {
    match edit {
        StructuralEdit::DeleteRows {
            tab_id,
            start_index,
            end_index,
        } => delete_dimension(*tab_id, "ROWS", *start_index, *end_index),
        StructuralEdit::DeleteColumns {
            tab_id,
            start_index,
            end_index,
        } => delete_dimension(*tab_id, "COLUMNS", *start_index, *end_index),
        StructuralEdit::AddTab(tab) => Request {
            add_sheet: Some(AddSheetRequest {
                properties: Some(SheetProperties {
                    title: Some(tab.title.clone()),
                    grid_properties: Some(GridProperties {
                        row_count: Some(tab.rows as i32),
                        column_count: Some(tab.cols as i32),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        },
    }
}

fn delete_dimension(tab_id: i32, dimension: &str, start_index: usize, end_index: usize) -> Request {
    Request {
        delete_dimension: Some(DeleteDimensionRequest {
            range: Some(DimensionRange {
                sheet_id: Some(tab_id),
                dimension: Some(dimension.to_string()),
                start_index: Some(start_index as i32),
                end_index: Some(end_index as i32),
            }),
        }),
        ..Default::default()
    }
}
