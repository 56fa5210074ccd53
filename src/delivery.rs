//! SOAP-over-HTTP delivery engine.
//!
//! The engine takes one rendered SOAP message, POSTs it to a WinRM endpoint
//! with HTTP Basic authentication and hands back either the raw response body
//! or a classified [`DeliveryError`].
//!
//! # Overview
//!
//! - Every call is an independent request. Credentials travel with the
//!   [`Target`] on each call and nothing is cached between calls.
//! - The engine never parses successful bodies. Callers extract shell IDs,
//!   command output, etc. from the returned [`SoapResponse`].
//! - No retries happen here; polling and retry policy belong to the caller.
//! - Wire dumps of request, response and fault bodies are emitted on the
//!   `winrm_courier::wire` tracing target when
//!   [`DeliveryConfig::verbose_logging`] is set, and never otherwise.
//!
//! # Example
//!
//! ```rust,ignore
//! use winrm_courier::delivery::{DeliveryConfig, DeliveryEngine, Target};
//! use winrm_courier::envelope::Identify;
//!
//! let engine = DeliveryEngine::new(DeliveryConfig::new().with_verbose_logging(true))?;
//! let target = Target::parse("http://windows-host:5985/wsman", "vagrant", "vagrant")?;
//!
//! let response = engine.deliver(&target, &Identify::new()).await?;
//! println!("{}", response.text()?);
//! ```

use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::error::{DeliveryError, Result};
use crate::fault::classify;

/// Content type sent with every SOAP request.
pub const SOAP_REQUEST_CONTENT_TYPE: &str = "application/soap+xml;charset=UTF-8";

/// Default WinRM HTTP endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5985/wsman";

/// Tracing target for request, response and fault body dumps.
pub const WIRE_TARGET: &str = "winrm_courier::wire";

// ============================================================================
// Deliverable
// ============================================================================

/// Anything that can render itself to a serialized SOAP message.
///
/// Request types (command execution, file chunks, ...) implement this
/// independently. The engine only borrows a deliverable for the duration of
/// the render and never retains it.
pub trait Deliverable {
    /// Render the complete SOAP envelope.
    fn to_xml(&self) -> String;
}

impl Deliverable for str {
    fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl Deliverable for String {
    fn to_xml(&self) -> String {
        self.clone()
    }
}

// ============================================================================
// Target
// ============================================================================

/// Endpoint and credentials for a single delivery.
#[derive(Clone)]
pub struct Target {
    endpoint: Url,
    user: String,
    password: String,
}

impl Target {
    /// Create a target from an already parsed endpoint URL.
    pub fn new(endpoint: Url, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            endpoint,
            user: user.into(),
            password: password.into(),
        }
    }

    /// Create a target, parsing the endpoint URL.
    pub fn parse(
        endpoint: &str,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> std::result::Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(endpoint)?, user, password))
    }

    /// The WinRM listener URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The Basic-Authentication user name.
    pub fn user(&self) -> &str {
        &self.user
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("endpoint", &self.endpoint.as_str())
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Construction options for a [`DeliveryEngine`].
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Dump request, response and fault bodies to the wire target
    pub verbose_logging: bool,
    /// Whole-request timeout applied by the HTTP client (None for no timeout)
    pub timeout: Option<Duration>,
    /// Verify TLS certificates on `https` endpoints
    pub verify_tls: bool,
    /// Additional PEM root certificate to trust
    pub ca_cert: Option<PathBuf>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            verbose_logging: false,
            timeout: None,
            verify_tls: true,
            ca_cert: None,
        }
    }
}

impl DeliveryConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable wire dumps
    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable TLS certificate verification
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Trust an additional PEM root certificate
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }
}

// ============================================================================
// Response
// ============================================================================

/// Raw body of a successful (HTTP 200) WinRM response.
///
/// The bytes are exactly what the endpoint sent; interpreting them is the
/// caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapResponse {
    body: Vec<u8>,
}

impl SoapResponse {
    /// Wrap a response body
    pub fn new(body: Vec<u8>) -> Self {
        Self { body }
    }

    /// The raw body bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    /// The body as UTF-8 text
    pub fn text(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// Take ownership of the body bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// A reader over the body, for streaming XML parsers
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.body)
    }

    /// Body length in bytes
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true if the endpoint sent an empty body
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl AsRef<[u8]> for SoapResponse {
    fn as_ref(&self) -> &[u8] {
        &self.body
    }
}

// ============================================================================
// Delivery Engine
// ============================================================================

/// Sends SOAP messages to WinRM endpoints and classifies the outcome.
///
/// Cloning is cheap and clones share the HTTP client's connection pool.
/// Concurrent deliveries share no other state.
#[derive(Debug, Clone)]
pub struct DeliveryEngine {
    client: Client,
    verbose_logging: bool,
}

impl DeliveryEngine {
    /// Build an engine and its HTTP client.
    pub fn new(config: DeliveryConfig) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(!config.verify_tls);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ca_path) = &config.ca_cert {
            let pem = std::fs::read(ca_path).map_err(|e| {
                DeliveryError::Client(format!(
                    "Failed to read CA cert '{}': {}",
                    ca_path.display(),
                    e
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| DeliveryError::Client(format!("Invalid CA cert: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| DeliveryError::Client(e.to_string()))?;

        Ok(Self::with_client(client, config.verbose_logging))
    }

    /// Wrap an existing HTTP client.
    pub fn with_client(client: Client, verbose_logging: bool) -> Self {
        Self {
            client,
            verbose_logging,
        }
    }

    /// Whether wire dumps are enabled.
    pub fn verbose_logging(&self) -> bool {
        self.verbose_logging
    }

    /// Render `message` and deliver it to `target`.
    ///
    /// Returns the full response body for HTTP 200, otherwise the classified
    /// error. The HTTP response is dropped before this returns on every path.
    pub async fn deliver<D>(&self, target: &Target, message: &D) -> Result<SoapResponse>
    where
        D: Deliverable + ?Sized,
    {
        let xml = message.to_xml();
        self.deliver_xml(target, xml).await
    }

    /// Deliver an already rendered SOAP message.
    pub async fn deliver_xml(&self, target: &Target, xml: String) -> Result<SoapResponse> {
        if self.verbose_logging {
            debug!(target: WIRE_TARGET, body = %xml, "winrm: sending");
        }

        debug!(
            endpoint = %target.endpoint,
            user = %target.user,
            bytes = xml.len(),
            "Delivering SOAP message"
        );

        let response = self
            .client
            .post(target.endpoint.clone())
            .basic_auth(&target.user, Some(&target.password))
            .header(CONTENT_TYPE, SOAP_REQUEST_CONTENT_TYPE)
            .body(xml)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %target.endpoint, error = %e, "WinRM request failed");
                DeliveryError::NetworkError(e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(self.reject(response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(DeliveryError::ResponseRead)?;

        if self.verbose_logging {
            debug!(
                target: WIRE_TARGET,
                body = %String::from_utf8_lossy(&body),
                "winrm: receiving"
            );
        }

        debug!(endpoint = %target.endpoint, bytes = body.len(), "WinRM request succeeded");
        Ok(SoapResponse::new(body.to_vec()))
    }

    /// Consume a non-200 response and classify it.
    async fn reject(&self, response: Response) -> DeliveryError {
        let status = response.status();
        let headers = response.headers().clone();

        // An unreadable error body still classifies; a fault becomes unparsable.
        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(e) => {
                debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                Vec::new()
            }
        };

        let err = classify(status, &headers, &body);

        if self.verbose_logging && matches!(err, DeliveryError::ProtocolFault { .. }) {
            debug!(
                target: WIRE_TARGET,
                body = %String::from_utf8_lossy(&body),
                "winrm: fault"
            );
        }

        debug!(status = status.as_u16(), error = %err, "WinRM request rejected");
        err
    }
}

/// Deliver one message with a default engine.
///
/// Convenience for one-shot callers; long-lived callers should keep a
/// [`DeliveryEngine`] so the HTTP connection pool is reused.
pub async fn deliver<D>(
    endpoint: &Url,
    user: &str,
    password: &str,
    message: &D,
) -> Result<SoapResponse>
where
    D: Deliverable + ?Sized,
{
    let engine = DeliveryEngine::new(DeliveryConfig::default())?;
    let target = Target::new(endpoint.clone(), user, password);
    engine.deliver(&target, message).await
}
