//! Legacy infrared remote-control codes over SOAP
//!
//! Remote buttons are sent as base64-looking IRCC codes wrapped in a fixed
//! SOAP envelope and posted to `/sony/IRCC`.

use std::sync::Arc;

use bravia_http::{HttpRequest, HttpTransport};
use xmltree::Element;

use crate::error::{ApiError, Result};
use crate::session::Session;

pub const IRCC_SOAP_ACTION: &str = "\"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC\"";

/// Sends IRCC codes using a session's credential
#[derive(Clone)]
pub struct IrccSender {
    session: Arc<Session>,
    transport: Arc<dyn HttpTransport>,
}

impl IrccSender {
    pub fn new(session: Arc<Session>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { session, transport }
    }

    /// Send one code and return the raw reply body
    pub fn send(&self, code: &str) -> Result<Vec<u8>> {
        let request = self.session.authorize(
            HttpRequest::post(self.session.ircc_url())
                .header("Content-Type", "text/xml; charset=UTF-8")
                .header("SOAPACTION", IRCC_SOAP_ACTION)
                .body(envelope(code)),
        );

        tracing::debug!(address = %self.session.base_address(), code, "X_SendIRCC");

        let response = self
            .transport
            .post(&request)
            .map_err(|e| ApiError::Ircc(e.to_string()))?;

        if !response.is_success() {
            let detail = fault_detail(&response.body)
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return Err(ApiError::Ircc(detail));
        }

        Ok(response.body.into_bytes())
    }
}

fn envelope(code: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0"?>"#,
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
            r#"<s:Body><u:X_SendIRCC xmlns:u="urn:schemas-sony-com:service:IRCC:1">"#,
            "<IRCCCode>{}</IRCCCode>",
            "</u:X_SendIRCC></s:Body></s:Envelope>"
        ),
        code
    )
}

/// Pull `errorCode`/`errorDescription` out of a SOAP fault, if present
fn fault_detail(body: &str) -> Option<String> {
    let xml = Element::parse(body.as_bytes()).ok()?;
    let fault = xml.get_child("Body")?.get_child("Fault")?;
    let upnp_error = fault.get_child("detail")?.get_child("UPnPError")?;

    let code = upnp_error
        .get_child("errorCode")
        .and_then(|c| c.get_text())
        .map(|t| t.trim().to_string())?;
    let description = upnp_error
        .get_child("errorDescription")
        .and_then(|d| d.get_text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    Some(format!("SOAP fault {}: {}", code, description))
}
