use std::path::{Path, PathBuf};

use error_stack::{report, ResultExt};
use tracing::instrument;

use crate::domain::settings::{PartialSettings, SettingKey, SettingsError};

/// The env-style `KEY=value` file holding persisted defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SettingsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that relative paths inside the store are relative to. `None` means the
    /// working directory.
    pub fn base_dir(&self) -> Option<&Path> {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }

    /// Loads the store as the lowest settings layer. A missing file is an empty layer.
    ///
    /// Unquoted values go through dotenv escaping, so `\n` in `C:\new` becomes a newline.
    /// Paths with backslashes must be single-quoted, which is how [`SettingsStore::save`]
    /// writes them.
    #[instrument]
    pub fn load(&self) -> error_stack::Result<PartialSettings, SettingsError> {
        let entries = match dotenvy::from_path_iter(&self.path) {
            Ok(entries) => entries,
            Err(error) if error.not_found() => return Ok(PartialSettings::default()),
            Err(error) => {
                return Err(report!(error))
                    .change_context(SettingsError::StoreUnreadable)
                    .attach_printable_lazy(|| format!("Error reading {}", self.path.display()));
            }
        };

        let values = entries
            .collect::<Result<Vec<(String, String)>, _>>()
            .change_context(SettingsError::StoreUnreadable)
            .attach_printable_lazy(|| {
                format!(
                    "{} must contain KEY=value lines; quote values with spaces or backslashes",
                    self.path.display()
                )
            })?;

        let mut layer = PartialSettings::from_key_values(values);
        for key in [SettingKey::ExcelFilePath, SettingKey::ServiceAccountFile] {
            if layer.get(key).is_some_and(|value| value.contains(['\n', '\t'])) {
                tracing::warn!(
                    "{} in {} contains a control character; single-quote paths with backslashes",
                    key,
                    self.path.display()
                );
            }
        }
        if let Some(base_dir) = self.base_dir() {
            for key in [SettingKey::ExcelFilePath, SettingKey::ServiceAccountFile] {
                let joined = layer.get(key).map(|value| base_dir.join(value));
                if let Some(joined) = joined {
                    layer.set(key, Some(joined.to_string_lossy().into_owned()));
                }
            }
        }

        tracing::debug!("Loaded settings store {}", self.path.display());
        Ok(layer)
    }

    /// Writes every key back in the same `KEY=value` shape it is read in.
    #[instrument]
    pub fn save(&self, settings: &PartialSettings) -> error_stack::Result<(), SettingsError> {
        let contents = settings
            .to_key_values()
            .into_iter()
            .map(|(key, value)| {
                let value = if key.is_path() {
                    self.relative_to_store(&value)
                } else {
                    value
                };
                format!("{}={}\n", key, quote_value(&value))
            })
            .collect::<String>();

        std::fs::write(&self.path, contents)
            .change_context(SettingsError::StoreUnwritable)
            .attach_printable_lazy(|| format!("Unable to write {}", self.path.display()))?;

        tracing::info!("Configuration saved to {}", self.path.display());
        Ok(())
    }

    fn relative_to_store(&self, value: &str) -> String {
        let path = Path::new(value);
        match self.base_dir() {
            Some(base_dir) => path
                .strip_prefix(base_dir)
                .map(|relative| relative.to_string_lossy().into_owned())
                .unwrap_or_else(|_| value.to_owned()),
            None => value.to_owned(),
        }
    }
}

/// Quotes a value so the dotenv parser reads it back unchanged: single quotes keep
/// backslashes and `$` literal, double quotes are the fallback for values holding `'`.
fn quote_value(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('$', "\\$")
            .replace('\n', "\\n");
        format!("\"{}\"", escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_store_is_empty_layer() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join(".env"));

        assert_eq!(store.load().unwrap(), PartialSettings::default());
    }

    #[test]
    fn test_load_reads_env_style_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# defaults\nGOOGLE_SPREADSHEET_ID=sheet-123\nGOOGLE_WORKSHEET_NAME=Import\nGOOGLE_COLUMNS=\"Name, Age\"\n",
        )
        .unwrap();

        let layer = SettingsStore::new(&path).load().unwrap();

        assert_eq!(layer.spreadsheet_id.as_deref(), Some("sheet-123"));
        assert_eq!(layer.worksheet_name.as_deref(), Some("Import"));
        assert_eq!(layer.columns.as_deref(), Some("Name, Age"));
    }

    #[test]
    fn test_relative_paths_resolve_against_store_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "EXCEL_FILE_PATH=data/input.xlsx\nGOOGLE_SERVICE_ACCOUNT_FILE=/abs/key.json\n",
        )
        .unwrap();

        let layer = SettingsStore::new(&path).load().unwrap();

        assert_eq!(
            layer.excel_file_path.map(PathBuf::from),
            Some(dir.path().join("data/input.xlsx"))
        );
        assert_eq!(layer.service_account_file.as_deref(), Some("/abs/key.json"));
    }

    #[test]
    fn test_save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let store = SettingsStore::new(&path);
        let settings = PartialSettings::from_key_values([
            (
                "EXCEL_FILE_PATH",
                dir.path().join("input.xlsx").to_string_lossy().into_owned(),
            ),
            ("GOOGLE_SPREADSHEET_ID", "sheet-123".to_owned()),
            ("GOOGLE_COLUMNS", "Name,Age".to_owned()),
        ]);

        store.save(&settings).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "EXCEL_FILE_PATH='input.xlsx'\n\
             EXCEL_SHEET_NAME=\n\
             GOOGLE_SERVICE_ACCOUNT_FILE=\n\
             GOOGLE_SPREADSHEET_ID='sheet-123'\n\
             GOOGLE_WORKSHEET_NAME=\n\
             GOOGLE_COLUMNS='Name,Age'\n"
        );
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_load_keeps_backslashes_in_quoted_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "GOOGLE_SERVICE_ACCOUNT_FILE='C:\\keys\\new\\svc.json'\n\
             EXCEL_SHEET_NAME=\"Q1 report\"\n\
             GOOGLE_WORKSHEET_NAME='Import $HOME'\n",
        )
        .unwrap();

        let layer = SettingsStore::new(&path).load().unwrap();

        let key_path = layer.service_account_file.unwrap();
        assert!(key_path.ends_with(r"C:\keys\new\svc.json"), "{}", key_path);
        assert!(!key_path.contains('\n'));
        assert_eq!(layer.excel_sheet_name.as_deref(), Some("Q1 report"));
        assert_eq!(layer.worksheet_name.as_deref(), Some("Import $HOME"));
    }

    #[test]
    fn test_save_then_load_keeps_windows_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let store = SettingsStore::new(&path);
        let settings = PartialSettings::from_key_values([
            (
                "GOOGLE_SERVICE_ACCOUNT_FILE",
                dir.path()
                    .join(r"C:\keys\new\svc.json")
                    .to_string_lossy()
                    .into_owned(),
            ),
            ("EXCEL_FILE_PATH", r"D:\data\tabela.xlsx".to_owned()),
            ("GOOGLE_WORKSHEET_NAME", "Import $HOME".to_owned()),
            ("GOOGLE_COLUMNS", "Name, Age".to_owned()),
        ]);

        store.save(&settings).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("GOOGLE_SERVICE_ACCOUNT_FILE='C:\\keys\\new\\svc.json'\n"));
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.service_account_file, settings.service_account_file);
        assert_eq!(reloaded.worksheet_name, settings.worksheet_name);
        assert_eq!(reloaded.columns, settings.columns);
        assert!(reloaded
            .excel_file_path
            .unwrap()
            .ends_with(r"D:\data\tabela.xlsx"));
    }

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value(""), "");
        assert_eq!(quote_value(r"C:\new"), r"'C:\new'");
        assert_eq!(
            quote_value(r#"O'Brien "Q1" $HOME C:\x"#),
            r#""O'Brien \"Q1\" \$HOME C:\\x""#
        );
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("missing").join(".env"));

        let report = store.save(&PartialSettings::default()).unwrap_err();

        assert_eq!(report.current_context(), &SettingsError::StoreUnwritable);
    }
}
