pub mod settings;
pub mod sheets;
pub mod table;

// Re-export commonly used types
pub use settings::*;
pub use table::*;
