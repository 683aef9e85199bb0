//! Config command implementation.

use crate::core::config::{Config, ConfigOverrides, ServerConfig};
use crate::net::tls::TlsConfigurator;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Configuration operations.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate configuration file.
    Validate {
        /// Config file path.
        #[arg(short, long, default_value = "config/peering.toml")]
        config: PathBuf,
    },
    /// Print configuration with defaults.
    Show {
        /// Config file path.
        #[arg(short, long, default_value = "config/peering.toml")]
        config: PathBuf,
        /// Output format (toml, json).
        #[arg(long, default_value = "toml")]
        format: String,
        /// Override the datacenter name.
        #[arg(long)]
        datacenter: Option<String>,
        /// Override the gRPC TLS port.
        #[arg(long)]
        grpc_tls_port: Option<i32>,
    },
}

/// Run the config command.
pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Validate { config } => validate_config(&config),
        ConfigCommand::Show {
            config,
            format,
            datacenter,
            grpc_tls_port,
        } => {
            let overrides = ConfigOverrides {
                datacenter,
                grpc_tls_port,
                ..Default::default()
            };
            show_config(&config, &format, &overrides)
        }
    }
}

fn validate_config(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Config file not found: {:?}", path);
    }

    let config = Config::from_file(path)?;
    println!("✓ Config file is valid");
    println!("  datacenter: {}", config.server.datacenter);

    if let Some(warning) = token_generation_warning(&config) {
        println!("  ⚠ Warning: {}", warning);
    }
    Ok(())
}

/// Why a server with this config could not generate peering tokens.
pub fn token_generation_warning(config: &Config) -> Option<&'static str> {
    if !config.server.connect_enabled {
        Some("connect is disabled; peering tokens cannot be generated")
    } else if config.server.grpc_tls_port <= 0 && !config.grpc_server_use_tls() {
        Some("gRPC TLS is not enabled; peering tokens cannot be generated")
    } else {
        None
    }
}

fn show_config(path: &PathBuf, format: &str, overrides: &ConfigOverrides) -> Result<()> {
    let mut config = Config::from_file(path)?;
    config.apply_overrides(overrides);
    config.validate().context("config invalid after overrides")?;

    let rendered = match format {
        "toml" => toml::to_string_pretty(&config)?,
        "json" => serde_json::to_string_pretty(&config)?,
        other => anyhow::bail!("Unknown format: {} (expected toml or json)", other),
    };
    println!("{}", rendered);
    Ok(())
}
