//! Token command implementation.

use crate::control::token::{decode_token, encode_token, PeeringToken};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Peering token operations.
#[derive(Args, Debug)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands.
#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Decode a token and print its contents as JSON.
    Inspect {
        /// The base64 token text.
        token: String,
        /// Print CA PEMs in full instead of a count.
        #[arg(long)]
        show_ca: bool,
    },
    /// Encode a JSON token description.
    Encode {
        /// JSON file with the token fields.
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Run the token command.
pub fn run_token(args: TokenArgs) -> Result<()> {
    match args.command {
        TokenCommand::Inspect { token, show_ca } => inspect_token(&token, show_ca),
        TokenCommand::Encode { file } => encode_file(&file),
    }
}

fn inspect_token(raw: &str, show_ca: bool) -> Result<()> {
    let token = decode_token(raw.as_bytes()).context("invalid peering token")?;
    println!("{}", render_token(&token, show_ca)?);
    Ok(())
}

/// Render a decoded token for display.
pub fn render_token(token: &PeeringToken, show_ca: bool) -> Result<String> {
    let mut value = serde_json::to_value(token)?;
    if !show_ca {
        value["CA"] = serde_json::json!(format!("<{} PEM(s)>", token.ca.len()));
    }
    if !token.establishment_secret.is_empty() {
        value["EstablishmentSecret"] = serde_json::json!("<redacted>");
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

fn encode_file(path: &PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read token file: {}", path.display()))?;
    let token: PeeringToken =
        serde_json::from_str(&content).with_context(|| "failed to parse token JSON")?;
    let encoded = encode_token(&token)?;
    println!("{}", String::from_utf8(encoded)?);
    Ok(())
}
