//! Command-line interface.
//!
//! Operator tooling for inspecting peering tokens, TLS names and config.

pub mod commands;

use clap::{Parser, Subcommand};

/// Peering backend operator tooling.
#[derive(Parser, Debug)]
#[command(name = "peering")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Peering token operations.
    Token(commands::TokenArgs),
    /// TLS name derivation.
    Tls(commands::TlsArgs),
    /// Configuration operations.
    Config(commands::ConfigArgs),
}

/// Initialize the tracing subscriber if the telemetry feature is enabled.
#[cfg(feature = "telemetry")]
pub fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[cfg(not(feature = "telemetry"))]
pub fn init_tracing(_level: Option<&str>) {}
