//! Peering token encoding.
//!
//! A token is the bearer artifact an operator copies from the accepting
//! cluster to the dialing cluster. It is JSON wrapped in standard base64 so
//! it survives being pasted through terminals and config files.

use crate::core::error::{PeeringError, PeeringResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Where the token was generated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PeeringTokenRemote {
    #[serde(default)]
    pub partition: String,
    #[serde(default)]
    pub datacenter: String,
}

/// Bootstrap token for a peering relationship.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PeeringToken {
    /// CA root PEMs to trust when dialing.
    #[serde(rename = "CA", default)]
    pub ca: Vec<String>,

    /// Operator-supplied addresses that override the resolved ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manual_server_addresses: Vec<String>,

    /// Resolved `host:port` dial targets. Never empty.
    pub server_addresses: Vec<String>,

    /// SAN to validate the accepting servers against.
    pub server_name: String,

    /// Peering id on the accepting side.
    #[serde(rename = "PeerID")]
    pub peer_id: String,

    /// One-time secret exchanged for a stream secret on establishment.
    #[serde(default)]
    pub establishment_secret: String,

    #[serde(default)]
    pub remote: PeeringTokenRemote,
}

impl PeeringToken {
    /// Addresses a dialer should use: manual overrides win when present.
    pub fn dial_addresses(&self) -> &[String] {
        if self.manual_server_addresses.is_empty() {
            &self.server_addresses
        } else {
            &self.manual_server_addresses
        }
    }

    fn check_addresses(&self) -> PeeringResult<()> {
        if self.server_addresses.is_empty() {
            return Err(PeeringError::structure("token has no server addresses"));
        }
        Ok(())
    }
}

/// Encode a token as base64 JSON.
pub fn encode_token(token: &PeeringToken) -> PeeringResult<Vec<u8>> {
    token.check_addresses()?;
    let json = serde_json::to_vec(token)
        .map_err(|e| PeeringError::structure(format!("failed to marshal token: {}", e)))?;
    Ok(STANDARD.encode(json).into_bytes())
}

/// Decode a base64 JSON token.
///
/// Carriage returns and line feeds are ignored, so wrapped or
/// newline-terminated tokens decode.
pub fn decode_token(raw: &[u8]) -> PeeringResult<PeeringToken> {
    let text: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| *b != b'\r' && *b != b'\n')
        .collect();
    let json = STANDARD
        .decode(text)
        .map_err(|source| PeeringError::Decode { source })?;
    let token: PeeringToken =
        serde_json::from_slice(&json).map_err(|e| PeeringError::structure(e.to_string()))?;
    token.check_addresses()?;
    Ok(token)
}
