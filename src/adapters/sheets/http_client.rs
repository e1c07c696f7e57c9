use error_stack::ResultExt;
use google_sheets4::{hyper, hyper_rustls};

use crate::ports::remote_sheet::RemoteSheetError;

pub type HttpsConnector = hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;

pub fn http_client() -> error_stack::Result<hyper::Client<HttpsConnector>, RemoteSheetError> {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .change_context(RemoteSheetError::Api)
        .attach_printable("Could not load the native TLS root certificates")?
        .https_or_http()
        .enable_http1()
        .build();

    Ok(hyper::Client::builder().build(connector))
}
