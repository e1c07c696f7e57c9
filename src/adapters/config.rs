pub mod layered_settings;
pub mod settings_store;
