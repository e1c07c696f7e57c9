use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{settings::Settings, table::Table};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableSourceError {
    #[error("Source file not found")]
    SourceMissing,
    #[error("Source file is unreadable or not a spreadsheet")]
    Unreadable,
    #[error("Workbook has no sheets")]
    NoSheets,
    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFound(String),
    #[error("Sheet has no header row")]
    NoHeaderRow,
    #[error("Columns not found in header: {}", .0.join(", "))]
    ColumnsNotFound(Vec<String>),
    #[error("Extracted rows do not line up with the header")]
    MalformedTable,
}

/// What to read: which file, which sheet (`None` is the first one) and which columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSelection {
    pub path: PathBuf,
    pub sheet: Option<String>,
    /// Empty selects every column in source order.
    pub columns: Vec<String>,
}

impl From<&Settings> for SourceSelection {
    fn from(settings: &Settings) -> Self {
        SourceSelection {
            path: settings.excel_file_path.clone(),
            sheet: settings.excel_sheet_name.clone(),
            columns: settings.columns.clone(),
        }
    }
}

pub trait TableSource: Send + Sync {
    fn read(&self, selection: &SourceSelection) -> error_stack::Result<Table, TableSourceError>;
}
