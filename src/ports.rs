pub mod remote_sheet;
pub mod settings_provider;
pub mod table_source;
