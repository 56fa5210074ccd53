//! Fuzz target for non-200 response classification.
//!
//! Arbitrary status codes, content types and bodies must always classify into
//! exactly one remote error without panicking.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use winrm_courier::error::DeliveryError;
use winrm_courier::fault::classify;

/// Arbitrary HTTP response for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzResponse {
    status: u16,
    soap: bool,
    content_type_suffix: String,
    body: Vec<u8>,
}

fuzz_target!(|input: FuzzResponse| {
    let Ok(status) = StatusCode::from_u16(input.status) else {
        return;
    };
    if status == StatusCode::OK {
        return;
    }

    let mut headers = HeaderMap::new();
    let content_type = if input.soap {
        format!("application/soap+xml{}", input.content_type_suffix)
    } else {
        input.content_type_suffix
    };
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        headers.insert(CONTENT_TYPE, value);
    }

    let err = classify(status, &headers, &input.body);
    assert!(err.is_remote());

    match status.as_u16() {
        401 => assert!(matches!(err, DeliveryError::AuthenticationFailed)),
        404 => assert!(matches!(err, DeliveryError::EndpointNotFound)),
        _ => assert!(matches!(
            err,
            DeliveryError::ProtocolFault { .. } | DeliveryError::TransportError { .. }
        )),
    }
});
