use std::path::PathBuf;

use strum::IntoEnumIterator;
use thiserror::Error;

/// Keys of the env-style settings store, in the order they are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum SettingKey {
    #[strum(serialize = "EXCEL_FILE_PATH")]
    ExcelFilePath,
    #[strum(serialize = "EXCEL_SHEET_NAME")]
    ExcelSheetName,
    #[strum(serialize = "GOOGLE_SERVICE_ACCOUNT_FILE")]
    ServiceAccountFile,
    #[strum(serialize = "GOOGLE_SPREADSHEET_ID")]
    SpreadsheetId,
    #[strum(serialize = "GOOGLE_WORKSHEET_NAME")]
    WorksheetName,
    #[strum(serialize = "GOOGLE_COLUMNS")]
    Columns,
}

impl SettingKey {
    pub fn is_required(&self) -> bool {
        !matches!(self, SettingKey::ExcelSheetName | SettingKey::Columns)
    }

    pub fn is_path(&self) -> bool {
        matches!(self, SettingKey::ExcelFilePath | SettingKey::ServiceAccountFile)
    }

    /// Case-insensitive lookup, so `excel_file_path` and `EXCEL_FILE_PATH` name the same key.
    pub fn from_name(name: &str) -> Option<Self> {
        SettingKey::iter().find(|key| key.to_string().eq_ignore_ascii_case(name.trim()))
    }
}

fn join_keys(keys: &[SettingKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Missing required settings: {}", join_keys(.0))]
    MissingFields(Vec<SettingKey>),
    #[error("Could not load settings from the settings store")]
    StoreUnreadable,
    #[error("Could not load settings from the environment")]
    EnvironmentUnreadable,
    #[error("Could not write settings to the settings store")]
    StoreUnwritable,
}

/// One layer of settings. Blank values are never stored, so "set to blank" and "unset" are the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialSettings {
    pub excel_file_path: Option<String>,
    pub excel_sheet_name: Option<String>,
    pub service_account_file: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub worksheet_name: Option<String>,
    pub columns: Option<String>,
}

impl PartialSettings {
    /// Builds a layer from raw key/value pairs, ignoring keys that are not settings.
    pub fn from_key_values<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = PartialSettings::default();
        for (name, value) in pairs {
            if let Some(key) = SettingKey::from_name(name.as_ref()) {
                settings.set(key, Some(value.into()));
            }
        }
        settings
    }

    pub fn set(&mut self, key: SettingKey, value: Option<String>) {
        *self.slot_mut(key) = value
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
    }

    pub fn get(&self, key: SettingKey) -> Option<&str> {
        match key {
            SettingKey::ExcelFilePath => self.excel_file_path.as_deref(),
            SettingKey::ExcelSheetName => self.excel_sheet_name.as_deref(),
            SettingKey::ServiceAccountFile => self.service_account_file.as_deref(),
            SettingKey::SpreadsheetId => self.spreadsheet_id.as_deref(),
            SettingKey::WorksheetName => self.worksheet_name.as_deref(),
            SettingKey::Columns => self.columns.as_deref(),
        }
    }

    fn slot_mut(&mut self, key: SettingKey) -> &mut Option<String> {
        match key {
            SettingKey::ExcelFilePath => &mut self.excel_file_path,
            SettingKey::ExcelSheetName => &mut self.excel_sheet_name,
            SettingKey::ServiceAccountFile => &mut self.service_account_file,
            SettingKey::SpreadsheetId => &mut self.spreadsheet_id,
            SettingKey::WorksheetName => &mut self.worksheet_name,
            SettingKey::Columns => &mut self.columns,
        }
    }

    /// Overlays `higher` on top of `self`: every field present in `higher` wins.
    pub fn merge(mut self, higher: PartialSettings) -> PartialSettings {
        for key in SettingKey::iter() {
            if let Some(value) = higher.get(key) {
                self.set(key, Some(value.to_owned()));
            }
        }
        self
    }

    /// Every key in persistence order; unset keys map to an empty string.
    pub fn to_key_values(&self) -> Vec<(SettingKey, String)> {
        SettingKey::iter()
            .map(|key| (key, self.get(key).unwrap_or_default().to_owned()))
            .collect()
    }

    /// Validates the merged layers once and produces the immutable run settings.
    pub fn resolve(&self) -> Result<Settings, SettingsError> {
        let missing = SettingKey::iter()
            .filter(|key| key.is_required() && self.get(*key).is_none())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(SettingsError::MissingFields(missing));
        }

        let required = |key: SettingKey| self.get(key).unwrap_or_default().to_owned();

        Ok(Settings {
            excel_file_path: PathBuf::from(required(SettingKey::ExcelFilePath)),
            excel_sheet_name: self.excel_sheet_name.clone(),
            service_account_file: PathBuf::from(required(SettingKey::ServiceAccountFile)),
            spreadsheet_id: required(SettingKey::SpreadsheetId),
            worksheet_name: required(SettingKey::WorksheetName),
            columns: parse_column_list(self.columns.as_deref().unwrap_or_default()),
        })
    }
}

/// Splits `"Name, Age,,Email"` into `["Name", "Age", "Email"]`.
pub fn parse_column_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Fully resolved settings for a single run. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub excel_file_path: PathBuf,
    pub excel_sheet_name: Option<String>,
    pub service_account_file: PathBuf,
    pub spreadsheet_id: String,
    pub worksheet_name: String,
    /// Empty means every column, in source order.
    pub columns: Vec<String>,
}

impl Settings {
    pub fn destination(&self) -> String {
        format!("'{}' in spreadsheet {}", self.worksheet_name, self.spreadsheet_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    pub dry_run: bool,
    pub verbose: bool,
}
