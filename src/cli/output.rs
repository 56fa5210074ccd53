//! Output formatting for the winrm-courier CLI
//!
//! Response bodies go to stdout untouched so they can be piped into other
//! tools. Status lines and errors go to stderr.

use colored::Colorize;
use std::io::{self, Write};
use winrm_courier::error::DeliveryError;

/// Output formatter
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            verbosity,
        }
    }

    /// Print an informational status line (shown with -v)
    pub fn info(&self, message: &str) {
        if self.verbosity == 0 {
            return;
        }
        if self.use_color {
            eprintln!("{} {}", "*".cyan(), message);
        } else {
            eprintln!("* {}", message);
        }
    }

    /// Print a labelled field
    pub fn field(&self, label: &str, value: &str) {
        if self.use_color {
            println!("{:<18} {}", format!("{}:", label).bold(), value);
        } else {
            println!("{:<18} {}", format!("{}:", label), value);
        }
    }

    /// Write a response body verbatim to stdout
    pub fn body(&self, body: &[u8]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(body)?;
        if !body.ends_with(b"\n") {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()
    }

    /// Print a delivery failure
    pub fn delivery_error(&self, err: &DeliveryError) {
        let kind = match err {
            DeliveryError::AuthenticationFailed => "authentication failed",
            DeliveryError::EndpointNotFound => "endpoint not found",
            DeliveryError::ProtocolFault { .. } => "SOAP fault",
            DeliveryError::TransportError { .. } => "HTTP error",
            DeliveryError::NetworkError(_) => "unreachable",
            DeliveryError::ResponseRead(_) => "truncated response",
            DeliveryError::Client(_) => "client error",
        };

        if self.use_color {
            eprintln!("{} {}: {}", "error".red().bold(), kind.red(), err);
        } else {
            eprintln!("error {}: {}", kind, err);
        }
    }
}
