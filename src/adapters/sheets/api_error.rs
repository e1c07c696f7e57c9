use error_stack::Report;
use google_sheets4::Error as Sheets4Error;
use serde_json::Value;

use crate::ports::remote_sheet::RemoteSheetError;

/// Sheets answers a missing tab with `400 Unable to parse range` rather than a 404.
const UNPARSEABLE_RANGE: &str = "Unable to parse range";

pub fn classify_status(status: Option<u16>, message: &str) -> RemoteSheetError {
    match status {
        Some(401) | Some(403) => RemoteSheetError::Authentication,
        Some(404) => RemoteSheetError::NotFound,
        Some(400) if message.contains(UNPARSEABLE_RANGE) => RemoteSheetError::NotFound,
        _ => RemoteSheetError::Api,
    }
}

fn status_and_message(body: &Value) -> (Option<u16>, String) {
    let error = &body["error"];
    let status = error["code"]
        .as_u64()
        .and_then(|code| u16::try_from(code).ok());
    let message = error["message"].as_str().unwrap_or_default().to_owned();
    (status, message)
}

pub fn classify(error: &Sheets4Error) -> RemoteSheetError {
    match error {
        Sheets4Error::MissingToken(_) | Sheets4Error::MissingAPIKey => {
            RemoteSheetError::Authentication
        }
        Sheets4Error::BadRequest(body) => {
            let (status, message) = status_and_message(body);
            classify_status(status, &message)
        }
        Sheets4Error::Failure(response) => classify_status(Some(response.status().as_u16()), ""),
        _ => RemoteSheetError::Api,
    }
}

/// Wraps a failed Sheets call in a report whose context follows the remote error taxonomy.
pub fn into_report(error: Sheets4Error) -> Report<RemoteSheetError> {
    let context = classify(&error);
    let detail = match &error {
        Sheets4Error::BadRequest(body) => status_and_message(body).1,
        other => other.to_string(),
    };
    Report::new(error)
        .change_context(context)
        .attach_printable(detail)
}
