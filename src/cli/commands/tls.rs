//! TLS command implementation.

use crate::net::tls::peering_server_san;
use anyhow::Result;
use clap::{Args, Subcommand};

/// TLS name derivation.
#[derive(Args, Debug)]
pub struct TlsArgs {
    #[command(subcommand)]
    pub command: TlsCommand,
}

/// TLS subcommands.
#[derive(Subcommand, Debug)]
pub enum TlsCommand {
    /// Print the SAN servers present to peers.
    San {
        /// Datacenter name.
        #[arg(long)]
        datacenter: String,
        /// CA trust domain.
        #[arg(long)]
        trust_domain: String,
    },
}

/// Run the tls command.
pub fn run_tls(args: TlsArgs) -> Result<()> {
    match args.command {
        TlsCommand::San {
            datacenter,
            trust_domain,
        } => {
            if datacenter.is_empty() || trust_domain.is_empty() {
                anyhow::bail!("--datacenter and --trust-domain must not be empty");
            }
            println!("{}", peering_server_san(&datacenter, &trust_domain));
            Ok(())
        }
    }
}
