//! winrm-courier - deliver SOAP messages to Windows hosts over WinRM
//!
//! This is the main entry point for the winrm-courier CLI.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use is_terminal::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use winrm_courier::config::Config;
use winrm_courier::delivery::WIRE_TARGET;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration: files, then environment, then flags
    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    // Initialize logging based on verbosity
    init_logging(cli.verbosity(), config.verbose_logging);

    let ctx = CommandContext::new(&cli, &config)?;

    // Execute the appropriate command
    let exit_code = match &cli.command {
        Commands::Identify(args) => ctx.identify(args).await?,
        Commands::Get(args) => ctx.get(args).await?,
        Commands::Send(args) => ctx.send(args).await?,
    };

    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
///
/// Wire dumps are only emitted by the engine when verbose logging is on; the
/// filter just has to let them through.
fn init_logging(verbosity: u8, verbose_logging: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let mut env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    if verbose_logging {
        if let Ok(directive) = format!("{}=debug", WIRE_TARGET).parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(verbosity >= 3 || verbose_logging),
        )
        .with(env_filter)
        .init();
}
