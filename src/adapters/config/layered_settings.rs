use std::collections::HashMap;

use config::{Config, Environment};
use error_stack::ResultExt;
use tracing::instrument;

use crate::{
    domain::settings::{PartialSettings, Settings, SettingsError},
    ports::settings_provider::SettingsProvider,
};

use super::settings_store::SettingsStore;

/// Settings layered lowest to highest: settings store, process environment, explicit overrides.
#[derive(Debug, Clone)]
pub struct LayeredSettings {
    store: SettingsStore,
    environment: Option<config::Map<String, String>>,
    overrides: PartialSettings,
}

impl LayeredSettings {
    pub fn new(store: SettingsStore, overrides: PartialSettings) -> Self {
        LayeredSettings {
            store,
            environment: None,
            overrides,
        }
    }

    /// Replaces the process environment with a fixed set of variables.
    pub fn with_environment(mut self, variables: config::Map<String, String>) -> Self {
        self.environment = Some(variables);
        self
    }

    fn environment_layer(&self) -> error_stack::Result<PartialSettings, SettingsError> {
        let values = Config::builder()
            .add_source(Environment::default().source(self.environment.clone()))
            .build()
            .and_then(|config| config.try_deserialize::<HashMap<String, String>>())
            .change_context(SettingsError::EnvironmentUnreadable)?;

        Ok(PartialSettings::from_key_values(values))
    }

    /// Every layer merged, before validation.
    #[instrument(skip(self))]
    pub fn merged(&self) -> error_stack::Result<PartialSettings, SettingsError> {
        let store = self.store.load()?;
        let environment = self.environment_layer()?;

        Ok(store.merge(environment).merge(self.overrides.clone()))
    }

    /// Writes the store values, with explicit overrides applied, back to the store.
    /// Environment variables are not persisted.
    #[instrument(skip(self))]
    pub fn persist(&self) -> error_stack::Result<PartialSettings, SettingsError> {
        let values = self.store.load()?.merge(self.overrides.clone());
        self.store.save(&values)?;
        Ok(values)
    }
}

impl SettingsProvider for LayeredSettings {
    fn settings(&self) -> error_stack::Result<Settings, SettingsError> {
        let merged = self.merged()?;
        let settings = merged.resolve().attach_printable_lazy(|| {
            format!(
                "Set the missing keys in {}, the environment, or on the command line",
                self.store.path().display()
            )
        })?;

        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::SettingKey;
    use std::path::PathBuf;

    fn environment(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn store_with(contents: &str) -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, contents).unwrap();
        (dir, SettingsStore::new(path))
    }

    #[test]
    fn test_environment_overrides_store_and_flags_override_environment() {
        let (_dir, store) = store_with(
            "EXCEL_FILE_PATH=/data/input.xlsx\n\
             GOOGLE_SERVICE_ACCOUNT_FILE=/keys/key.json\n\
             GOOGLE_SPREADSHEET_ID=from-store\n\
             GOOGLE_WORKSHEET_NAME=FromStore\n",
        );
        let mut overrides = PartialSettings::default();
        overrides.set(SettingKey::WorksheetName, Some("FromFlag".to_owned()));

        let settings = LayeredSettings::new(store, overrides)
            .with_environment(environment(&[
                ("GOOGLE_SPREADSHEET_ID", "from-env"),
                ("GOOGLE_WORKSHEET_NAME", "FromEnv"),
            ]))
            .settings()
            .unwrap();

        assert_eq!(settings.excel_file_path, PathBuf::from("/data/input.xlsx"));
        assert_eq!(settings.spreadsheet_id, "from-env");
        assert_eq!(settings.worksheet_name, "FromFlag");
    }

    #[test]
    fn test_missing_fields_fail_with_configuration_error() {
        let (_dir, store) = store_with("GOOGLE_SPREADSHEET_ID=sheet-123\n");

        let report = LayeredSettings::new(store, PartialSettings::default())
            .with_environment(environment(&[]))
            .settings()
            .unwrap_err();

        assert_eq!(
            report.current_context(),
            &SettingsError::MissingFields(vec![
                SettingKey::ExcelFilePath,
                SettingKey::ServiceAccountFile,
                SettingKey::WorksheetName,
            ])
        );
    }

    #[test]
    fn test_columns_from_environment_are_parsed() {
        let (_dir, store) = store_with("");

        let settings = LayeredSettings::new(store, PartialSettings::default())
            .with_environment(environment(&[
                ("EXCEL_FILE_PATH", "/data/input.xlsx"),
                ("GOOGLE_SERVICE_ACCOUNT_FILE", "/keys/key.json"),
                ("GOOGLE_SPREADSHEET_ID", "sheet-123"),
                ("GOOGLE_WORKSHEET_NAME", "Import"),
                ("GOOGLE_COLUMNS", "Name, ,Age"),
            ]))
            .settings()
            .unwrap();

        assert_eq!(settings.columns, vec!["Name", "Age"]);
    }

    #[test]
    fn test_persist_writes_store_and_overrides_but_not_environment() {
        let (_dir, store) = store_with("GOOGLE_SPREADSHEET_ID=from-store\n");
        let path = store.path().to_path_buf();
        let mut overrides = PartialSettings::default();
        overrides.set(SettingKey::WorksheetName, Some("Import".to_owned()));

        LayeredSettings::new(store, overrides)
            .with_environment(environment(&[("GOOGLE_COLUMNS", "Secret")]))
            .persist()
            .unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("GOOGLE_SPREADSHEET_ID='from-store'\n"));
        assert!(written.contains("GOOGLE_WORKSHEET_NAME='Import'\n"));
        assert!(written.contains("GOOGLE_COLUMNS=\n"));
    }
}
