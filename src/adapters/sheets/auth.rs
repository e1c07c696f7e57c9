use std::path::Path;

use error_stack::ResultExt;
use google_sheets4::api::Scope;
use google_sheets4::hyper;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use tracing::instrument;

use crate::ports::remote_sheet::RemoteSheetError;

use super::http_client::HttpsConnector;

/// Read/write access to spreadsheets, requested for the eager token and every call.
pub const TOKEN_SCOPE: Scope = Scope::Spreadsheet;

/// Builds a service-account authenticator and fetches one token up front, so bad
/// credentials fail here instead of on the first destructive call.
#[instrument(skip(client))]
pub async fn auth(
    priv_key_path: &Path,
    client: hyper::Client<HttpsConnector>,
) -> error_stack::Result<Authenticator<HttpsConnector>, RemoteSheetError> {
    let secret: oauth2::ServiceAccountKey = oauth2::read_service_account_key(priv_key_path)
        .await
        .change_context(RemoteSheetError::Authentication)
        .attach_printable_lazy(|| {
            format!(
                "Could not read service account private key at '{}'",
                priv_key_path.display()
            )
        })?;

    let authenticator = oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(RemoteSheetError::Authentication)
        .attach_printable("Could not create an authenticator")?;

    authenticator
        .token(&[TOKEN_SCOPE.as_ref()])
        .await
        .change_context(RemoteSheetError::Authentication)
        .attach_printable_lazy(|| {
            format!(
                "Service account key at '{}' was rejected",
                priv_key_path.display()
            )
        })?;

    Ok(authenticator)
}
