use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use excel_sheets_sync::{
    adapters::{
        config::{layered_settings::LayeredSettings, settings_store::SettingsStore},
        sheets::spreadsheet_manager::GoogleSheetsConnector,
        workbook::workbook_reader::WorkbookReader,
    },
    application::{
        transfer::{TransferOutcome, TransferRoutine},
        transfer_error::{failure_message, TransferError},
    },
    domain::settings::{PartialSettings, RunMode, SettingKey, SettingsError},
};
use tracing::{error, info, instrument};

/// Replace a Google Sheets tab with the contents of a local Excel sheet.
#[derive(Debug, Clone, Parser)]
#[command(name = "excel-sheets-sync", version, about)]
pub struct Cli {
    /// Read and validate everything, but do not touch the Google Sheet
    #[arg(long)]
    pub dry_run: bool,

    /// Log every step, and print the full error report on failure
    #[arg(short, long)]
    pub verbose: bool,

    /// Settings file with KEY=value lines
    #[arg(long, value_name = "PATH", default_value = ".env")]
    pub env_file: PathBuf,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Source workbook [EXCEL_FILE_PATH]
    #[arg(long, value_name = "PATH")]
    pub excel_file: Option<String>,

    /// Source sheet, first sheet when omitted [EXCEL_SHEET_NAME]
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Service account key JSON [GOOGLE_SERVICE_ACCOUNT_FILE]
    #[arg(long, value_name = "PATH")]
    pub service_account: Option<String>,

    /// Target spreadsheet ID [GOOGLE_SPREADSHEET_ID]
    #[arg(long, value_name = "ID")]
    pub spreadsheet_id: Option<String>,

    /// Target tab [GOOGLE_WORKSHEET_NAME]
    #[arg(long, value_name = "NAME")]
    pub worksheet: Option<String>,

    /// Comma separated columns to copy, all when omitted [GOOGLE_COLUMNS]
    #[arg(long, value_name = "LIST")]
    pub columns: Option<String>,

    /// Write the settings file and command line values back to the settings file before running
    #[arg(long)]
    pub save_config: bool,
}

impl Cli {
    pub fn run_mode(&self) -> RunMode {
        RunMode {
            dry_run: self.dry_run,
            verbose: self.verbose,
        }
    }

    /// The explicit layer: flags given on the command line.
    pub fn overrides(&self) -> PartialSettings {
        let mut overrides = PartialSettings::default();
        overrides.set(SettingKey::ExcelFilePath, self.excel_file.clone());
        overrides.set(SettingKey::ExcelSheetName, self.sheet.clone());
        overrides.set(SettingKey::ServiceAccountFile, self.service_account.clone());
        overrides.set(SettingKey::SpreadsheetId, self.spreadsheet_id.clone());
        overrides.set(SettingKey::WorksheetName, self.worksheet.clone());
        overrides.set(SettingKey::Columns, self.columns.clone());
        overrides
    }
}

pub struct CliAdapter {
    cli: Cli,
    settings: Arc<LayeredSettings>,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("cli", &self.cli)
            .field("settings", &"<LayeredSettings>")
            .finish()
    }
}

impl CliAdapter {
    pub fn new(cli: Cli) -> Self {
        let store = SettingsStore::new(cli.env_file.clone());
        let settings = Arc::new(LayeredSettings::new(store, cli.overrides()));
        Self { cli, settings }
    }

    fn save_config(&self) -> error_stack::Result<(), SettingsError> {
        self.settings.persist()?;
        Ok(())
    }

    /// Runs one transfer. Returns `true` when it ended in `Done`.
    #[instrument(skip(self))]
    pub async fn run(&self) -> bool {
        if self.cli.save_config {
            if let Err(report) = self.save_config() {
                error!("❌ Could not save settings: {}", report.current_context());
                if self.cli.verbose {
                    error!("{:?}", report);
                }
                return false;
            }
        }

        let routine = TransferRoutine::new(
            self.settings.clone(),
            Arc::new(WorkbookReader),
            Arc::new(GoogleSheetsConnector),
        );

        match routine.run(self.cli.run_mode()).await {
            Ok(outcome) => {
                self.report_success(&outcome);
                true
            }
            Err(report) => {
                self.report_failure(&report);
                false
            }
        }
    }

    fn report_success(&self, outcome: &TransferOutcome) {
        info!("✅ {}", outcome);
        tracing::debug!("Columns: {}", outcome.summary().columns.join(", "));
    }

    fn report_failure(&self, report: &error_stack::Report<TransferError>) {
        let failure = report.current_context();
        error!(
            "❌ Transfer failed at {} stage: {}",
            failure.stage,
            failure_message(report)
        );
        if self.cli.verbose {
            error!("{:?}", report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["excel-sheets-sync"]);

        assert!(!cli.dry_run);
        assert!(!cli.save_config);
        assert_eq!(cli.env_file, PathBuf::from(".env"));
        assert_eq!(cli.overrides(), PartialSettings::default());
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::parse_from([
            "excel-sheets-sync",
            "--dry-run",
            "--verbose",
            "--worksheet",
            "Import",
            "--columns",
            "Name,Age",
            "--sheet",
            " ",
        ]);

        let overrides = cli.overrides();

        assert_eq!(
            cli.run_mode(),
            RunMode {
                dry_run: true,
                verbose: true
            }
        );
        assert_eq!(overrides.worksheet_name.as_deref(), Some("Import"));
        assert_eq!(overrides.columns.as_deref(), Some("Name,Age"));
        assert_eq!(overrides.excel_sheet_name, None);
    }
}
