//! CLI module for winrm-courier
//!
//! This module provides the command-line interface: argument parsing,
//! command-line configuration overrides, and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use winrm_courier::config::Config;

/// winrm-courier - deliver SOAP messages to Windows hosts over WinRM
#[derive(Parser, Debug, Clone)]
#[command(name = "winrm-courier")]
#[command(author = "winrm-courier Contributors")]
#[command(version)]
#[command(about = "Deliver SOAP messages to Windows hosts over WinRM", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// WinRM endpoint URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// User to authenticate as
    #[arg(short = 'u', long, global = true)]
    pub user: Option<String>,

    /// Password for the user
    #[arg(short = 'p', long = "pass", global = true)]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Dump request, response and fault bodies
    #[arg(long, global = true)]
    pub debug: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Probe the endpoint with a WS-Management Identify request
    Identify(IdentifyArgs),

    /// Fetch a resource with WS-Transfer Get
    Get(GetArgs),

    /// Deliver a pre-rendered SOAP envelope
    Send(SendArgs),
}

/// Arguments for identify command
#[derive(Args, Debug, Clone)]
pub struct IdentifyArgs {
    /// Print the raw response body instead of the identity fields
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for get command
#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// Resource URI (e.g. http://schemas.microsoft.com/wbem/wsman/1/config)
    pub resource_uri: String,

    /// Selector as NAME=VALUE (repeatable)
    #[arg(
        short = 's',
        long = "selector",
        value_parser = parse_selector,
        action = clap::ArgAction::Append
    )]
    pub selectors: Vec<(String, String)>,

    /// Operation timeout as an ISO 8601 duration
    #[arg(long, default_value = "PT60S")]
    pub operation_timeout: String,
}

/// Arguments for send command
#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Envelope file, or '-' for stdin
    pub file: PathBuf,
}

impl Cli {
    /// Get the verbosity level
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Apply command-line overrides on top of file and environment configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = Some(timeout);
        }
        if self.insecure {
            config.verify_tls = false;
        }
        if self.debug {
            config.verbose_logging = true;
        }
    }
}

/// Parse a `NAME=VALUE` selector
fn parse_selector(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("invalid selector '{}', expected NAME=VALUE", s)),
    }
}
