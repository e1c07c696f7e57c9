use crate::domain::settings::{Settings, SettingsError};

pub trait SettingsProvider: Send + Sync {
    fn settings(&self) -> error_stack::Result<Settings, SettingsError>;
}

impl SettingsProvider for Settings {
    fn settings(&self) -> error_stack::Result<Settings, SettingsError> {
        Ok(self.clone())
    }
}
