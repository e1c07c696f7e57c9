use std::{path::PathBuf, sync::Arc};

use error_stack::Report;
use tracing::{instrument, Instrument};

use crate::{
    domain::{
        settings::{RunMode, Settings},
        table::Table,
    },
    ports::{
        remote_sheet::RemoteSheetConnector,
        settings_provider::SettingsProvider,
        table_source::{SourceSelection, TableSource},
    },
};

use super::transfer_error::{at_stage, Stage, TransferError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    pub source: PathBuf,
    pub destination: String,
}

impl TransferSummary {
    fn new(settings: &Settings, table: &Table) -> Self {
        TransferSummary {
            rows: table.row_count(),
            columns: table.header().to_vec(),
            source: settings.excel_file_path.clone(),
            destination: settings.destination(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Dry run: configuration and source were valid, the remote tab was not touched.
    Validated(TransferSummary),
    Transferred(TransferSummary),
}

impl TransferOutcome {
    pub fn summary(&self) -> &TransferSummary {
        match self {
            TransferOutcome::Validated(summary) | TransferOutcome::Transferred(summary) => summary,
        }
    }
}

impl std::fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferOutcome::Validated(summary) => write!(
                f,
                "Dry run OK: {} rows with columns [{}] from {} would replace {}",
                summary.rows,
                summary.columns.join(", "),
                summary.source.display(),
                summary.destination
            ),
            TransferOutcome::Transferred(summary) => write!(
                f,
                "Transferred {} rows from {} to {}",
                summary.rows,
                summary.source.display(),
                summary.destination
            ),
        }
    }
}

/// Configure, read, then (unless dry run) authenticate, clear and write. Stops at the first
/// failing stage. A failed write leaves the tab cleared; nothing is retried or rolled back.
pub struct TransferRoutine {
    settings: Arc<dyn SettingsProvider>,
    source: Arc<dyn TableSource>,
    connector: Arc<dyn RemoteSheetConnector>,
}

impl std::fmt::Debug for TransferRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferRoutine").finish_non_exhaustive()
    }
}

fn stage_span(stage: Stage) -> tracing::Span {
    tracing::span!(tracing::Level::INFO, "stage", stage = %stage)
}

impl TransferRoutine {
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        source: Arc<dyn TableSource>,
        connector: Arc<dyn RemoteSheetConnector>,
    ) -> Self {
        TransferRoutine {
            settings,
            source,
            connector,
        }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, mode: RunMode) -> error_stack::Result<TransferOutcome, TransferError> {
        let settings = {
            let _span = stage_span(Stage::Configuration).entered();
            self.settings
                .settings()
                .map_err(|report| at_stage(report, Stage::Configuration))?
        };

        let table = {
            let _span = stage_span(Stage::Read).entered();
            self.source
                .read(&SourceSelection::from(&settings))
                .map_err(|report| at_stage(report, Stage::Read))?
        };

        let summary = TransferSummary::new(&settings, &table);

        if mode.dry_run {
            if !settings.service_account_file.is_file() {
                tracing::warn!(
                    "Service account file {} does not exist; a real run would fail to authenticate",
                    settings.service_account_file.display()
                );
            }
            tracing::info!("Dry run enabled; skipping Google Sheet updates.");
            return Ok(TransferOutcome::Validated(summary));
        }

        let session = self
            .connector
            .authenticate(&settings.service_account_file)
            .instrument(stage_span(Stage::Authenticate))
            .await
            .map_err(|report| at_stage(report, Stage::Authenticate))?;

        session
            .clear(&settings.spreadsheet_id, &settings.worksheet_name)
            .instrument(stage_span(Stage::Clear))
            .await
            .map_err(|report| at_stage(report, Stage::Clear))?;

        session
            .write(&settings.spreadsheet_id, &settings.worksheet_name, &table)
            .instrument(stage_span(Stage::Write))
            .await
            .map_err(|report: Report<_>| {
                tracing::error!(
                    "Write failed after clear; {} is now empty",
                    settings.destination()
                );
                at_stage(report, Stage::Write)
            })?;

        tracing::info!("Data transfer completed successfully.");
        Ok(TransferOutcome::Transferred(summary))
    }
}
