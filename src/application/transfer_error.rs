use error_stack::{AttachmentKind, FrameKind, Report};
use thiserror::Error;

use crate::{
    domain::settings::SettingsError,
    ports::{remote_sheet::RemoteSheetError, table_source::TableSourceError},
};

/// Pipeline step at which a transfer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Configuration,
    Read,
    Authenticate,
    Clear,
    Write,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferErrorKind {
    #[error("Configuration error")]
    Configuration,
    #[error("Source read error")]
    SourceRead,
    #[error("Column not found: {}", .0.join(", "))]
    ColumnNotFound(Vec<String>),
    #[error("Remote authentication error")]
    RemoteAuth,
    #[error("Remote document or tab not found")]
    RemoteNotFound,
    #[error("Remote API error")]
    RemoteApi,
    #[error("Unexpected error")]
    Unexpected,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} during {stage} stage")]
pub struct TransferError {
    pub stage: Stage,
    pub kind: TransferErrorKind,
}

impl TransferError {
    pub fn new(stage: Stage, kind: TransferErrorKind) -> Self {
        TransferError { stage, kind }
    }
}

impl From<&SettingsError> for TransferErrorKind {
    fn from(_: &SettingsError) -> Self {
        TransferErrorKind::Configuration
    }
}

impl From<&TableSourceError> for TransferErrorKind {
    fn from(error: &TableSourceError) -> Self {
        match error {
            TableSourceError::ColumnsNotFound(columns) => {
                TransferErrorKind::ColumnNotFound(columns.clone())
            }
            TableSourceError::MalformedTable => TransferErrorKind::Unexpected,
            _ => TransferErrorKind::SourceRead,
        }
    }
}

impl From<&RemoteSheetError> for TransferErrorKind {
    fn from(error: &RemoteSheetError) -> Self {
        match error {
            RemoteSheetError::Authentication => TransferErrorKind::RemoteAuth,
            RemoteSheetError::NotFound => TransferErrorKind::RemoteNotFound,
            RemoteSheetError::Api => TransferErrorKind::RemoteApi,
        }
    }
}

/// Moves a component report into the transfer taxonomy, tagging it with `stage`.
pub fn at_stage<C>(report: Report<C>, stage: Stage) -> Report<TransferError>
where
    C: error_stack::Context,
    for<'a> &'a C: Into<TransferErrorKind>,
{
    let kind = report.current_context().into();
    report.change_context(TransferError::new(stage, kind))
}

/// One-line human readable cause: every context and printable attachment, outermost first.
pub fn failure_message(report: &Report<TransferError>) -> String {
    report
        .frames()
        .filter_map(|frame| match frame.kind() {
            FrameKind::Context(context) => Some(context.to_string()),
            FrameKind::Attachment(AttachmentKind::Printable(printable)) => {
                Some(printable.to_string())
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::{report, ResultExt};

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Configuration.to_string(), "configuration");
        assert_eq!(Stage::Authenticate.to_string(), "authenticate");
        assert_eq!(Stage::Write.to_string(), "write");
    }

    #[test]
    fn test_kind_from_component_errors() {
        assert_eq!(
            TransferErrorKind::from(&TableSourceError::ColumnsNotFound(vec!["Z".to_owned()])),
            TransferErrorKind::ColumnNotFound(vec!["Z".to_owned()])
        );
        assert_eq!(
            TransferErrorKind::from(&TableSourceError::SourceMissing),
            TransferErrorKind::SourceRead
        );
        assert_eq!(
            TransferErrorKind::from(&RemoteSheetError::NotFound),
            TransferErrorKind::RemoteNotFound
        );
        assert_eq!(
            TransferErrorKind::from(&SettingsError::StoreUnreadable),
            TransferErrorKind::Configuration
        );
    }

    #[test]
    fn test_at_stage_keeps_cause() {
        let component: error_stack::Result<(), RemoteSheetError> =
            Err(report!(RemoteSheetError::Api)).attach_printable("quota exceeded");

        let report = at_stage(component.unwrap_err(), Stage::Write);

        assert_eq!(
            report.current_context(),
            &TransferError::new(Stage::Write, TransferErrorKind::RemoteApi)
        );
        assert_eq!(
            failure_message(&report),
            "Remote API error during write stage: quota exceeded: Remote API call failed"
        );
    }
}
