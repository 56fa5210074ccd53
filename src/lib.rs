//! # winrm-courier - SOAP delivery over WinRM
//!
//! winrm-courier delivers WS-Management SOAP messages to Windows hosts over
//! HTTP and turns every outcome into either the raw response body or one
//! structured [`DeliveryError`].
//!
//! ## Core Concepts
//!
//! - **Deliverables**: anything that renders itself to a SOAP envelope
//! - **Delivery Engine**: POSTs one envelope with Basic authentication and
//!   classifies the HTTP response
//! - **Fault Classification**: 401, 404, SOAP faults and other HTTP errors
//!   become distinct error variants
//! - **Envelopes**: `Identify`, a WS-Management header builder, and raw
//!   pre-rendered documents
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │          Caller (session layer, file upload, CLI commands)           │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │ Deliverable
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Delivery Engine                              │
//! │         (reqwest POST, Basic auth, optional wire dumps)              │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                    ┌───────────────┴───────────────┐
//!                    ▼                               ▼
//!          ┌──────────────────┐           ┌─────────────────────┐
//!          │   200: body      │           │  classify + fault   │
//!          │  (SoapResponse)  │           │  (DeliveryError)    │
//!          └──────────────────┘           └─────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use winrm_courier::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let engine = DeliveryEngine::new(DeliveryConfig::default())?;
//!     let target = Target::parse("http://windows-host:5985/wsman", "vagrant", "vagrant")?;
//!
//!     match engine.deliver(&target, &Identify::new()).await {
//!         Ok(response) => println!("{}", response.text()?),
//!         Err(DeliveryError::AuthenticationFailed) => eprintln!("bad credentials"),
//!         Err(err) => eprintln!("{}", err),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::config::Config;
    pub use crate::delivery::{
        deliver, Deliverable, DeliveryConfig, DeliveryEngine, SoapResponse, Target,
    };
    pub use crate::envelope::{Envelope, Identify, IdentifyResponse, RawEnvelope};
    pub use crate::error::{DeliveryError, Result};
}

/// Error types for delivery operations.
pub mod error;

/// SOAP-over-HTTP delivery engine.
pub mod delivery;

/// Response classification and SOAP fault parsing.
pub mod fault;

/// WS-Management envelope source.
pub mod envelope;

/// Configuration loading and merging.
pub mod config;

/// Streaming XML path lookup.
pub mod xml;

pub use delivery::{deliver, Deliverable, DeliveryConfig, DeliveryEngine, SoapResponse, Target};
pub use error::DeliveryError;
