//! Fuzz target for SOAP fault body parsing.
//!
//! Any byte sequence must produce a protocol fault with status 500 and either
//! a `FAULT: ` reason or the unparsable placeholder.

#![no_main]

use libfuzzer_sys::fuzz_target;
use winrm_courier::error::{DeliveryError, FAULT_PREFIX, FAULT_STATUS, UNPARSABLE_FAULT};
use winrm_courier::fault::parse_fault;

fuzz_target!(|data: &[u8]| {
    match parse_fault(data) {
        DeliveryError::ProtocolFault {
            status_code,
            reason,
        } => {
            assert_eq!(status_code, FAULT_STATUS);
            assert!(reason.starts_with(FAULT_PREFIX) || reason == UNPARSABLE_FAULT);
        }
        other => panic!("parse_fault returned {:?}", other),
    }
});
