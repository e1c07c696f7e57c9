use std::{fmt::Debug, path::Path};

use error_stack::{report, ResultExt};
use google_sheets4::{
    api::{ClearValuesRequest, ValueRange},
    Sheets,
};
use tracing::instrument;

use crate::{
    domain::{
        sheets::{
            a1_notation::{A1Notation, ToA1Notation},
            cell_range::CellRange,
        },
        table::Table,
    },
    ports::remote_sheet::{RemoteSheetConnector, RemoteSheetError, RemoteSheetSession},
};

use super::{
    api_error,
    auth::{self},
    http_client::{self, HttpsConnector},
    value_range_factory::ValueRangeFactory,
};

/// One authenticated Google Sheets session.
pub struct SpreadsheetManager {
    hub: Sheets<HttpsConnector>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ .. }}")
    }
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub async fn new(priv_key_path: &Path) -> error_stack::Result<Self, RemoteSheetError> {
        let client = http_client::http_client()?;
        let auth = auth::auth(priv_key_path, client.clone()).await?;
        let hub: Sheets<HttpsConnector> = Sheets::new(client, auth);

        Ok(SpreadsheetManager { hub })
    }

    #[instrument]
    async fn sheet_titles(
        &self,
        document_id: &str,
    ) -> error_stack::Result<Vec<String>, RemoteSheetError> {
        let response = self
            .hub
            .spreadsheets()
            .get(document_id)
            .include_grid_data(false)
            .add_scope(auth::TOKEN_SCOPE)
            .doit()
            .await
            .map_err(api_error::into_report)
            .attach_printable_lazy(|| format!("Failed to open spreadsheet {}", document_id))?;

        let titles = response
            .1
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| sheet.properties.and_then(|props| props.title))
            .collect();

        Ok(titles)
    }

    #[instrument]
    async fn ensure_tab_exists(
        &self,
        document_id: &str,
        tab_name: &str,
    ) -> error_stack::Result<(), RemoteSheetError> {
        let titles = self.sheet_titles(document_id).await?;
        if titles.iter().any(|title| title == tab_name) {
            return Ok(());
        }

        Err(report!(RemoteSheetError::NotFound)).attach_printable_lazy(|| {
            format!(
                "Worksheet '{}' not found in spreadsheet {} (tabs: {:?})",
                tab_name, document_id, titles
            )
        })
    }
}

#[async_trait::async_trait]
impl RemoteSheetSession for SpreadsheetManager {
    #[instrument]
    async fn clear(
        &self,
        document_id: &str,
        tab_name: &str,
    ) -> error_stack::Result<(), RemoteSheetError> {
        self.ensure_tab_exists(document_id, tab_name).await?;

        let range = A1Notation::whole_sheet(tab_name);
        tracing::info!("Clearing worksheet {}", range);

        self.hub
            .spreadsheets()
            .values_clear(ClearValuesRequest::default(), document_id, range.as_ref())
            .add_scope(auth::TOKEN_SCOPE)
            .doit()
            .await
            .map(|_| ())
            .map_err(api_error::into_report)
            .attach_printable_lazy(|| format!("Failed to clear range {}", range))
    }

    #[instrument(skip(table), fields(rows = table.row_count(), columns = table.column_count()))]
    async fn write(
        &self,
        document_id: &str,
        tab_name: &str,
        table: &Table,
    ) -> error_stack::Result<(), RemoteSheetError> {
        let block = CellRange::anchored_block(table.row_count() + 1, table.column_count());
        let range = block.to_a1_notation(Some(tab_name));
        tracing::info!(
            "Uploading {} rows (including header) and {} columns to {}",
            block.row_count(),
            block.column_count(),
            range
        );

        self.hub
            .spreadsheets()
            .values_update(ValueRange::from_table(table, &range), document_id, range.as_ref())
            .value_input_option("USER_ENTERED")
            .add_scope(auth::TOKEN_SCOPE)
            .doit()
            .await
            .map(|_| ())
            .map_err(api_error::into_report)
            .attach_printable_lazy(|| format!("Failed to write to range {}", range))
    }
}

/// Opens [`SpreadsheetManager`] sessions from a service-account key file.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleSheetsConnector;

#[async_trait::async_trait]
impl RemoteSheetConnector for GoogleSheetsConnector {
    async fn authenticate(
        &self,
        credential: &Path,
    ) -> error_stack::Result<Box<dyn RemoteSheetSession>, RemoteSheetError> {
        let manager = SpreadsheetManager::new(credential).await?;
        Ok(Box::new(manager))
    }
}
