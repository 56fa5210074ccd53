//! Shared fixtures for the winrm-courier integration tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;
use url::Url;
use wiremock::MockServer;

use winrm_courier::delivery::{DeliveryConfig, DeliveryEngine, Target};

/// Content type WinRM uses for SOAP responses and faults.
pub const SOAP_RESPONSE_TYPE: &str = "application/soap+xml;charset=UTF-8";

/// Path the mock listener is mounted on.
pub const WSMAN_PATH: &str = "/wsman";

pub const USER: &str = "vagrant";
pub const PASSWORD: &str = "vagrant";

/// A typical fault returned by a Windows listener for a denied shell create.
pub const ACCESS_DENIED_FAULT: &str = r#"<s:Envelope xml:lang="en-US" xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://schemas.xmlsoap.org/ws/2004/08/addressing" xmlns:x="http://schemas.xmlsoap.org/ws/2004/09/transfer" xmlns:e="http://schemas.xmlsoap.org/ws/2004/08/eventing" xmlns:n="http://schemas.xmlsoap.org/ws/2004/09/enumeration" xmlns:w="http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd" xmlns:p="http://schemas.microsoft.com/wbem/wsman/1/wsman.xsd">
  <s:Header>
    <a:Action>http://schemas.dmtf.org/wbem/wsman/1/wsman/fault</a:Action>
    <a:MessageID>uuid:2C1E8D38-6D80-4F5D-9C5E-6C0B4B1E0F11</a:MessageID>
  </s:Header>
  <s:Body>
    <s:Fault>
      <s:Code>
        <s:Value>s:Sender</s:Value>
        <s:Subcode><s:Value>w:AccessDenied</s:Value></s:Subcode>
      </s:Code>
      <s:Reason><s:Text xml:lang="en-US">Access is denied.</s:Text></s:Reason>
      <s:Detail>
        <f:WSManFault xmlns:f="http://schemas.microsoft.com/wbem/wsman/1/wsmanfault" Code="5" Machine="win01">
          <f:Message>Access is denied.</f:Message>
        </f:WSManFault>
      </s:Detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;

/// A minimal successful IdentifyResponse.
pub const IDENTIFY_RESPONSE: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
  <s:Header/>
  <s:Body>
    <wsmid:IdentifyResponse xmlns:wsmid="http://schemas.dmtf.org/wbem/wsman/identity/1/wsmanidentity.xsd">
      <wsmid:ProtocolVersion>http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd</wsmid:ProtocolVersion>
      <wsmid:ProductVendor>Microsoft Corporation</wsmid:ProductVendor>
      <wsmid:ProductVersion>OS: 10.0.17763 SP: 0.0 Stack: 3.0</wsmid:ProductVersion>
    </wsmid:IdentifyResponse>
  </s:Body>
</s:Envelope>"#;

/// Target pointing at the mock server's WS-Management path.
pub fn target_for(server: &MockServer) -> Target {
    let endpoint = Url::parse(&format!("{}{}", server.uri(), WSMAN_PATH)).unwrap();
    Target::new(endpoint, USER, PASSWORD)
}

/// Engine with default options.
pub fn engine() -> DeliveryEngine {
    DeliveryEngine::new(DeliveryConfig::default()).unwrap()
}

/// Engine with wire dumps switched on or off.
pub fn engine_with_verbose(verbose: bool) -> DeliveryEngine {
    DeliveryEngine::new(DeliveryConfig::new().with_verbose_logging(verbose)).unwrap()
}

/// An endpoint on a local port that nothing listens on.
pub fn unreachable_endpoint() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{}{}", port, WSMAN_PATH)).unwrap()
}

/// A one-shot listener that answers 200 with a `Content-Length` larger than
/// the body it sends, then closes the connection.
pub fn truncated_response_endpoint() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !String::from_utf8_lossy(&request).contains("</s:Envelope>") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/soap+xml\r\n\
                  Content-Length: 100\r\n\r\n<partial",
            )
            .unwrap();
        stream.flush().unwrap();
    });

    Url::parse(&format!("http://127.0.0.1:{}{}", port, WSMAN_PATH)).unwrap()
}

/// In-memory log sink for a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
