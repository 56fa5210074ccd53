//! WS-Management envelopes.
//!
//! A small envelope source so the delivery engine can be driven without a
//! session layer: the protocol-level `Identify` probe, a generic
//! WS-Addressing/WS-Management [`Envelope`] builder, and [`RawEnvelope`] for
//! pre-rendered documents.

use std::io::Read;
use std::path::Path;

use url::Url;
use uuid::Uuid;

use crate::delivery::{Deliverable, SoapResponse};
use crate::xml::{find_text, xml_escape};

/// SOAP 1.2 envelope namespace
pub const SOAP_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
/// WS-Addressing namespace
pub const WSA_NS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing";
/// WS-Management namespace
pub const WSMAN_NS: &str = "http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd";
/// WS-Management identity namespace
pub const WSMID_NS: &str = "http://schemas.dmtf.org/wbem/wsman/identity/1/wsmanidentity.xsd";

/// Anonymous WS-Addressing reply address
pub const ANONYMOUS_ADDRESS: &str =
    "http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous";

/// WS-Transfer Get action
pub const ACTION_GET: &str = "http://schemas.xmlsoap.org/ws/2004/09/transfer/Get";

/// Default maximum envelope size advertised to the service
pub const DEFAULT_MAX_ENVELOPE_SIZE: u32 = 153600;

/// Default operation timeout (ISO 8601 duration)
pub const DEFAULT_OPERATION_TIMEOUT: &str = "PT60S";

// ============================================================================
// Identify
// ============================================================================

/// WS-Management `Identify` request.
///
/// Needs no addressing headers or resource URI, which makes it the cheapest
/// way to check that a listener is up and the credentials are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identify;

impl Identify {
    /// Create an Identify request
    pub fn new() -> Self {
        Self
    }
}

impl Deliverable for Identify {
    fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="{SOAP_ENV_NS}" xmlns:wsmid="{WSMID_NS}">
  <s:Header/>
  <s:Body>
    <wsmid:Identify/>
  </s:Body>
</s:Envelope>"#
        )
    }
}

/// Fields of an `IdentifyResponse` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifyResponse {
    /// Supported WS-Management protocol version URI
    pub protocol_version: Option<String>,
    /// Vendor of the WS-Management service
    pub product_vendor: Option<String>,
    /// Product (and OS) version string
    pub product_version: Option<String>,
}

impl IdentifyResponse {
    /// Read the identity fields from a successful response.
    ///
    /// Returns `None` if the body is not well-formed XML.
    pub fn from_response(response: &SoapResponse) -> Option<Self> {
        let body = response.as_bytes();
        Some(Self {
            protocol_version: identity_field(body, b"ProtocolVersion")?,
            product_vendor: identity_field(body, b"ProductVendor")?,
            product_version: identity_field(body, b"ProductVersion")?,
        })
    }
}

fn identity_field(body: &[u8], name: &[u8]) -> Option<Option<String>> {
    let path: [&[u8]; 2] = [b"IdentifyResponse", name];
    find_text(body, &path).ok()
}

// ============================================================================
// Envelope Builder
// ============================================================================

/// A WS-Management request envelope with addressing headers.
///
/// # Example
///
/// ```rust
/// use url::Url;
/// use winrm_courier::delivery::Deliverable;
/// use winrm_courier::envelope::{Envelope, ACTION_GET};
///
/// let to = Url::parse("http://localhost:5985/wsman").unwrap();
/// let xml = Envelope::new(&to, ACTION_GET)
///     .resource_uri("http://schemas.microsoft.com/wbem/wsman/1/config")
///     .to_xml();
/// assert!(xml.contains("<a:Action s:mustUnderstand=\"true\">"));
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    to: String,
    action: String,
    resource_uri: Option<String>,
    message_id: Uuid,
    max_envelope_size: u32,
    operation_timeout: String,
    locale: Option<String>,
    selectors: Vec<(String, String)>,
    body: Option<String>,
}

impl Envelope {
    /// Create an envelope addressed to `to` for the given action URI.
    pub fn new(to: &Url, action: impl Into<String>) -> Self {
        Self {
            to: to.to_string(),
            action: action.into(),
            resource_uri: None,
            message_id: Uuid::new_v4(),
            max_envelope_size: DEFAULT_MAX_ENVELOPE_SIZE,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT.to_string(),
            locale: None,
            selectors: Vec::new(),
            body: None,
        }
    }

    /// Set the resource URI
    pub fn resource_uri(mut self, uri: impl Into<String>) -> Self {
        self.resource_uri = Some(uri.into());
        self
    }

    /// Override the generated message ID
    pub fn message_id(mut self, id: Uuid) -> Self {
        self.message_id = id;
        self
    }

    /// Set the maximum envelope size
    pub fn max_envelope_size(mut self, size: u32) -> Self {
        self.max_envelope_size = size;
        self
    }

    /// Set the operation timeout (ISO 8601 duration, e.g. `PT20S`)
    pub fn operation_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.operation_timeout = timeout.into();
        self
    }

    /// Request fault messages in the given locale (e.g. `en-US`)
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Add a selector to the selector set
    pub fn selector(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.selectors.push((name.into(), value.into()));
        self
    }

    /// Set the body content. The fragment is inserted as-is.
    pub fn body(mut self, fragment: impl Into<String>) -> Self {
        self.body = Some(fragment.into());
        self
    }

    /// The message ID sent in the `a:MessageID` header
    pub fn id(&self) -> Uuid {
        self.message_id
    }

    fn render_header(&self) -> String {
        let mut header = String::new();
        header.push_str(&format!("    <a:To>{}</a:To>\n", xml_escape(&self.to)));
        if let Some(uri) = &self.resource_uri {
            header.push_str(&format!(
                "    <w:ResourceURI s:mustUnderstand=\"true\">{}</w:ResourceURI>\n",
                xml_escape(uri)
            ));
        }
        header.push_str(&format!(
            "    <a:ReplyTo>\n      <a:Address s:mustUnderstand=\"true\">{}</a:Address>\n    </a:ReplyTo>\n",
            ANONYMOUS_ADDRESS
        ));
        header.push_str(&format!(
            "    <a:Action s:mustUnderstand=\"true\">{}</a:Action>\n",
            xml_escape(&self.action)
        ));
        header.push_str(&format!(
            "    <a:MessageID>uuid:{}</a:MessageID>\n",
            self.message_id.as_hyphenated()
        ));
        header.push_str(&format!(
            "    <w:MaxEnvelopeSize s:mustUnderstand=\"true\">{}</w:MaxEnvelopeSize>\n",
            self.max_envelope_size
        ));
        header.push_str(&format!(
            "    <w:OperationTimeout>{}</w:OperationTimeout>\n",
            xml_escape(&self.operation_timeout)
        ));
        if let Some(locale) = &self.locale {
            header.push_str(&format!(
                "    <w:Locale xml:lang=\"{}\" s:mustUnderstand=\"false\"/>\n",
                xml_escape(locale)
            ));
        }
        if !self.selectors.is_empty() {
            header.push_str("    <w:SelectorSet>\n");
            for (name, value) in &self.selectors {
                header.push_str(&format!(
                    "      <w:Selector Name=\"{}\">{}</w:Selector>\n",
                    xml_escape(name),
                    xml_escape(value)
                ));
            }
            header.push_str("    </w:SelectorSet>\n");
        }
        header
    }
}

impl Deliverable for Envelope {
    fn to_xml(&self) -> String {
        let body = match &self.body {
            Some(fragment) => format!("  <s:Body>\n{}\n  </s:Body>", fragment),
            None => "  <s:Body/>".to_string(),
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="{SOAP_ENV_NS}" xmlns:a="{WSA_NS}" xmlns:w="{WSMAN_NS}">
  <s:Header>
{}  </s:Header>
{}
</s:Envelope>"#,
            self.render_header(),
            body
        )
    }
}

// ============================================================================
// Raw Envelope
// ============================================================================

/// A pre-rendered SOAP document, delivered verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEnvelope {
    xml: String,
}

impl RawEnvelope {
    /// Wrap an XML document
    pub fn new(xml: impl Into<String>) -> Self {
        Self { xml: xml.into() }
    }

    /// Load a document from a file
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        std::fs::read_to_string(path).map(Self::new)
    }

    /// Read a document from any reader (e.g. stdin)
    pub fn from_reader(mut reader: impl Read) -> std::io::Result<Self> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        Ok(Self::new(xml))
    }
}

impl Deliverable for RawEnvelope {
    fn to_xml(&self) -> String {
        self.xml.clone()
    }
}
