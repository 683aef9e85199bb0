//! Peering backend - operator CLI entrypoint.
//!
//! Usage:
//!   peering token inspect <token>
//!   peering token encode --file token.json
//!   peering tls san --datacenter dc1 --trust-domain <cluster-id>.consul
//!   peering config validate --config config/peering.toml

use anyhow::Result;
use clap::Parser;
use peering_backend::cli::commands::{run_config, run_tls, run_token};
use peering_backend::cli::{init_tracing, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Token(args) => run_token(args),
        Commands::Tls(args) => run_tls(args),
        Commands::Config(args) => run_config(args),
    }
}
