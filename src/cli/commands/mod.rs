//! Subcommands for the winrm-courier CLI
//!
//! Each subcommand builds one envelope, delivers it, and prints the outcome.
//! Delivery failures are reported and turned into an exit code; they never
//! abort the process.

use crate::cli::output::OutputFormatter;
use crate::cli::{GetArgs, IdentifyArgs, SendArgs};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;
use winrm_courier::config::Config;
use winrm_courier::delivery::{Deliverable, DeliveryEngine, SoapResponse, Target};
use winrm_courier::envelope::{Envelope, Identify, IdentifyResponse, RawEnvelope, ACTION_GET};

/// Common context shared between commands
pub struct CommandContext {
    /// Output formatter
    pub output: OutputFormatter,
    /// Delivery engine built from the configuration
    pub engine: DeliveryEngine,
    /// Endpoint and credentials
    pub target: Target,
}

impl CommandContext {
    /// Create a new command context from CLI arguments and merged configuration
    pub fn new(cli: &crate::cli::Cli, config: &Config) -> Result<Self> {
        let output = OutputFormatter::new(!cli.no_color, cli.verbosity());
        let target = config.target()?;
        let engine = DeliveryEngine::new(config.delivery_config())
            .context("Failed to initialize the delivery engine")?;

        Ok(Self {
            output,
            engine,
            target,
        })
    }

    /// Deliver a message, reporting failures. Returns the response or an exit code.
    async fn deliver<D>(&self, message: &D) -> std::result::Result<SoapResponse, i32>
    where
        D: Deliverable + ?Sized,
    {
        self.output.info(&format!(
            "Delivering to {} as {}",
            self.target.endpoint(),
            self.target.user()
        ));

        match self.engine.deliver(&self.target, message).await {
            Ok(response) => {
                debug!(bytes = response.len(), "Received response");
                Ok(response)
            }
            Err(err) => {
                self.output.delivery_error(&err);
                Err(err.exit_code())
            }
        }
    }

    /// `identify`: probe the endpoint
    pub async fn identify(&self, args: &IdentifyArgs) -> Result<i32> {
        let response = match self.deliver(&Identify::new()).await {
            Ok(response) => response,
            Err(code) => return Ok(code),
        };

        match IdentifyResponse::from_response(&response) {
            Some(identity) if !args.raw && identity != IdentifyResponse::default() => {
                let fields = [
                    ("Protocol version", &identity.protocol_version),
                    ("Product vendor", &identity.product_vendor),
                    ("Product version", &identity.product_version),
                ];
                for (label, value) in fields {
                    self.output.field(label, value.as_deref().unwrap_or("-"));
                }
            }
            _ => self.output.body(response.as_bytes())?,
        }

        Ok(0)
    }

    /// `get`: WS-Transfer Get of a resource URI
    pub async fn get(&self, args: &GetArgs) -> Result<i32> {
        let mut envelope = Envelope::new(self.target.endpoint(), ACTION_GET)
            .resource_uri(&args.resource_uri)
            .operation_timeout(&args.operation_timeout);
        for (name, value) in &args.selectors {
            envelope = envelope.selector(name, value);
        }

        match self.deliver(&envelope).await {
            Ok(response) => {
                self.output.body(response.as_bytes())?;
                Ok(0)
            }
            Err(code) => Ok(code),
        }
    }

    /// `send`: deliver a pre-rendered envelope from a file or stdin
    pub async fn send(&self, args: &SendArgs) -> Result<i32> {
        let envelope = read_envelope(&args.file)?;

        match self.deliver(&envelope).await {
            Ok(response) => {
                self.output.body(response.as_bytes())?;
                Ok(0)
            }
            Err(code) => Ok(code),
        }
    }
}

/// Read an envelope from a path, where `-` means stdin
fn read_envelope(path: &Path) -> Result<RawEnvelope> {
    if path == Path::new("-") {
        RawEnvelope::from_reader(std::io::stdin().lock())
            .context("Failed to read envelope from stdin")
    } else {
        RawEnvelope::from_file(path)
            .with_context(|| format!("Failed to read envelope file: {}", path.display()))
    }
}
