//! HTTP response classification and SOAP fault parsing.
//!
//! A non-200 response is turned into exactly one [`DeliveryError`]. Status
//! codes take precedence over content-type sniffing: a 401 carrying a SOAP
//! fault body is still an authentication failure.
//!
//! Fault bodies are scanned for the first `//Fault/Reason/Text` element.
//! Element names are compared by local name, so `s:Fault`, `env:Fault` and an
//! unprefixed `Fault` all match.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::trace;

use crate::error::DeliveryError;
use crate::xml::find_text;

/// Content type prefix identifying a SOAP 1.2 response.
pub const SOAP_CONTENT_TYPE: &str = "application/soap+xml";

/// Local names of the elements leading to the fault reason.
const REASON_PATH: [&[u8]; 3] = [b"Fault", b"Reason", b"Text"];

/// Classify a non-200 HTTP response into a [`DeliveryError`].
///
/// Rules are applied in order and the first match wins:
///
/// 1. `401` is [`DeliveryError::AuthenticationFailed`]
/// 2. `404` is [`DeliveryError::EndpointNotFound`]
/// 3. a `Content-Type` starting with `application/soap+xml` is parsed as a
///    SOAP fault (see [`parse_fault`])
/// 4. anything else is a [`DeliveryError::TransportError`]
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> DeliveryError {
    match status {
        StatusCode::UNAUTHORIZED => DeliveryError::AuthenticationFailed,
        StatusCode::NOT_FOUND => DeliveryError::EndpointNotFound,
        _ if is_soap_fault(headers) => parse_fault(body),
        _ => DeliveryError::transport(status),
    }
}

/// Returns true if the response headers announce a SOAP document.
pub fn is_soap_fault(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(SOAP_CONTENT_TYPE))
}

/// Parse a SOAP fault body into a [`DeliveryError::ProtocolFault`].
///
/// Never fails: a body that is not well-formed XML, or that has no
/// `Fault/Reason/Text` element, yields the `unparsable SOAP error` placeholder.
///
/// # Example
///
/// ```rust
/// use winrm_courier::fault::parse_fault;
///
/// let body = b"<Fault><Reason><Text>Access is denied.</Text></Reason></Fault>";
/// assert_eq!(parse_fault(body).to_string(), "[500] FAULT: Access is denied.");
/// ```
pub fn parse_fault(body: &[u8]) -> DeliveryError {
    match fault_reason(body) {
        Some(reason) => DeliveryError::protocol_fault(reason),
        None => DeliveryError::unparsable_fault(),
    }
}

/// Extract the text of the first `//Fault/Reason/Text` element.
///
/// Returns `None` when the body is not well-formed or the path is absent.
pub fn fault_reason(body: &[u8]) -> Option<String> {
    match find_text(body, &REASON_PATH) {
        Ok(Some(reason)) => Some(reason),
        Ok(None) => {
            trace!("Fault body has no Fault/Reason/Text element");
            None
        }
        Err(e) => {
            trace!(error = %e, "Fault body is not well-formed XML");
            None
        }
    }
}
