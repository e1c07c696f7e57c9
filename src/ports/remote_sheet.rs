use std::path::Path;

use thiserror::Error;

use crate::domain::table::Table;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteSheetError {
    #[error("Remote service rejected the credentials")]
    Authentication,
    #[error("Remote document or tab not found")]
    NotFound,
    #[error("Remote API call failed")]
    Api,
}

#[async_trait::async_trait]
pub trait RemoteSheetConnector: Send + Sync {
    /// Authenticates once with the service-account key at `credential` and opens a session.
    async fn authenticate(
        &self,
        credential: &Path,
    ) -> error_stack::Result<Box<dyn RemoteSheetSession>, RemoteSheetError>;
}

#[async_trait::async_trait]
pub trait RemoteSheetSession: Send + Sync {
    /// Removes every value from the tab, keeping its dimensions and formatting.
    async fn clear(
        &self,
        document_id: &str,
        tab_name: &str,
    ) -> error_stack::Result<(), RemoteSheetError>;

    /// Writes the header and all rows as one block starting at `A1`, in a single call.
    async fn write(
        &self,
        document_id: &str,
        tab_name: &str,
        table: &Table,
    ) -> error_stack::Result<(), RemoteSheetError>;
}
