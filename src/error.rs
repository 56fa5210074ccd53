//! Error types for winrm-courier.
//!
//! Every delivery attempt ends in exactly one outcome: a [`SoapResponse`] or
//! one [`DeliveryError`] variant. The enum is closed so consumers can match
//! on it exhaustively.
//!
//! [`SoapResponse`]: crate::delivery::SoapResponse

use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Status code attached to every SOAP fault, whatever the HTTP status was.
pub const FAULT_STATUS: u16 = 500;

/// Marker prepended to a fault reason extracted from `Fault/Reason/Text`.
pub const FAULT_PREFIX: &str = "FAULT: ";

/// Reason used when a fault body cannot be parsed or has no reason text.
pub const UNPARSABLE_FAULT: &str = "unparsable SOAP error";

/// Errors produced by a single delivery to a WinRM endpoint.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The endpoint rejected the credentials (HTTP 401).
    #[error("[401] failed to authenticate")]
    AuthenticationFailed,

    /// Nothing is listening on the WinRM endpoint path (HTTP 404).
    #[error("[404] nothing listening on the endpoint")]
    EndpointNotFound,

    /// The remote host answered with a SOAP Fault.
    #[error("[{status_code}] {reason}")]
    ProtocolFault {
        /// Always [`FAULT_STATUS`]
        status_code: u16,
        /// `FAULT: <reason>` or [`UNPARSABLE_FAULT`]
        reason: String,
    },

    /// Any other non-200 HTTP status without a SOAP content type.
    #[error("[{status_code}] {status_text}")]
    TransportError {
        /// HTTP status code
        status_code: u16,
        /// Canonical reason phrase for the status code
        status_text: String,
    },

    /// The HTTP request itself could not be completed.
    #[error("HTTP request failed: {0}")]
    NetworkError(#[source] reqwest::Error),

    /// The status was 200 but the response body could not be read in full.
    #[error("Failed to read response body: {0}")]
    ResponseRead(#[source] reqwest::Error),

    /// The HTTP client could not be built from the delivery configuration.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl DeliveryError {
    /// Creates a protocol fault carrying a reason extracted from a fault body.
    pub fn protocol_fault(reason: impl AsRef<str>) -> Self {
        Self::ProtocolFault {
            status_code: FAULT_STATUS,
            reason: format!("{}{}", FAULT_PREFIX, reason.as_ref()),
        }
    }

    /// Creates the placeholder fault for bodies that cannot be explained.
    pub fn unparsable_fault() -> Self {
        Self::ProtocolFault {
            status_code: FAULT_STATUS,
            reason: UNPARSABLE_FAULT.to_string(),
        }
    }

    /// Creates a transport error for a status code, using its canonical reason phrase.
    pub fn transport(status: reqwest::StatusCode) -> Self {
        Self::TransportError {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// Returns the HTTP-level status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DeliveryError::AuthenticationFailed => Some(401),
            DeliveryError::EndpointNotFound => Some(404),
            DeliveryError::ProtocolFault { status_code, .. }
            | DeliveryError::TransportError { status_code, .. } => Some(*status_code),
            DeliveryError::NetworkError(_)
            | DeliveryError::ResponseRead(_)
            | DeliveryError::Client(_) => None,
        }
    }

    /// Returns true if the remote host produced an HTTP response.
    pub fn is_remote(&self) -> bool {
        self.status_code().is_some()
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeliveryError::NetworkError(_) | DeliveryError::EndpointNotFound => 2,
            DeliveryError::AuthenticationFailed => 3,
            DeliveryError::ProtocolFault { .. } => 4,
            DeliveryError::TransportError { .. }
            | DeliveryError::ResponseRead(_)
            | DeliveryError::Client(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_identity_messages() {
        assert_eq!(
            DeliveryError::AuthenticationFailed.to_string(),
            "[401] failed to authenticate"
        );
        assert_eq!(
            DeliveryError::EndpointNotFound.to_string(),
            "[404] nothing listening on the endpoint"
        );
    }

    #[test]
    fn test_protocol_fault_prefix() {
        let err = DeliveryError::protocol_fault("Access is denied.");
        assert_eq!(err.to_string(), "[500] FAULT: Access is denied.");
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn test_unparsable_fault() {
        match DeliveryError::unparsable_fault() {
            DeliveryError::ProtocolFault {
                status_code,
                reason,
            } => {
                assert_eq!(status_code, FAULT_STATUS);
                assert_eq!(reason, UNPARSABLE_FAULT);
            }
            other => panic!("Expected ProtocolFault, got {:?}", other),
        }
    }

    #[test]
    fn test_transport_uses_reason_phrase() {
        let err = DeliveryError::transport(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "[503] Service Unavailable");

        let unknown = reqwest::StatusCode::from_u16(599).unwrap();
        match DeliveryError::transport(unknown) {
            DeliveryError::TransportError {
                status_code,
                status_text,
            } => {
                assert_eq!(status_code, 599);
                assert_eq!(status_text, "");
            }
            other => panic!("Expected TransportError, got {:?}", other),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(DeliveryError::AuthenticationFailed.exit_code(), 3);
        assert_eq!(DeliveryError::EndpointNotFound.exit_code(), 2);
        assert_eq!(DeliveryError::unparsable_fault().exit_code(), 4);
        assert_eq!(DeliveryError::Client("tls".into()).exit_code(), 1);
        assert!(!DeliveryError::Client("tls".into()).is_remote());
    }
}
