//! TLS materials for peering.
//!
//! A dialing peer needs two things to open a mutually trusted channel to
//! this cluster: the SAN our servers present and the CA roots that sign it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   TlsMaterialsProvider                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │   ServerConfig      - datacenter, connect, gRPC TLS port    │
//! │   TlsConfigurator   - runtime "gRPC uses TLS" query         │
//! │   StateReader       - CA roots + trust domain               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::control::state::StateReader;
use crate::core::config::ServerConfig;
use crate::core::error::{PeeringError, PeeringResult};
use std::sync::Arc;

/// Runtime TLS configuration query.
pub trait TlsConfigurator: Send + Sync {
    /// Whether the gRPC server is configured to serve TLS.
    fn grpc_server_use_tls(&self) -> bool;
}

/// Server name and CA trust material handed to a dialing peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsMaterials {
    /// SAN the dialer validates our server certificate against.
    pub server_name: String,
    /// CA root PEMs, each ending in a newline.
    pub ca_pems: Vec<String>,
}

/// SAN presented by servers of `datacenter` to peers.
///
/// Stable for a given cluster identity so a peer can pin it.
pub fn peering_server_san(datacenter: &str, trust_domain: &str) -> String {
    format!("server.{}.peering.{}", datacenter, trust_domain)
}

/// Append a newline unless the PEM already ends with one.
pub fn ensure_trailing_newline(pem: &str) -> String {
    if pem.is_empty() || pem.ends_with('\n') {
        pem.to_string()
    } else {
        format!("{}\n", pem)
    }
}

/// Derives peering TLS materials from server config and CA state.
pub struct TlsMaterialsProvider {
    server: ServerConfig,
    configurator: Arc<dyn TlsConfigurator>,
    state: Arc<dyn StateReader>,
}

impl TlsMaterialsProvider {
    /// Create a provider.
    pub fn new(
        server: ServerConfig,
        configurator: Arc<dyn TlsConfigurator>,
        state: Arc<dyn StateReader>,
    ) -> Self {
        Self {
            server,
            configurator,
            state,
        }
    }

    /// Check if gRPC is served over TLS, either on a dedicated port or via
    /// the TLS configurator.
    pub fn grpc_tls_enabled(&self) -> bool {
        self.server.grpc_tls_port > 0 || self.configurator.grpc_server_use_tls()
    }

    /// Derive the server name and CA PEMs.
    ///
    /// Token generation additionally requires connect and gRPC TLS to be
    /// enabled; those checks run before the CA is consulted.
    pub fn materials(&self, generating_token: bool) -> PeeringResult<TlsMaterials> {
        if generating_token {
            if !self.server.connect_enabled {
                return Err(PeeringError::configuration(
                    "connect.enabled must be set to true in the server's configuration when generating peering tokens",
                ));
            }
            if !self.grpc_tls_enabled() {
                return Err(PeeringError::configuration(
                    "TLS for gRPC must be enabled when generating peering tokens",
                ));
            }
        }

        let roots = self
            .state
            .ca_roots()
            .map_err(|e| PeeringError::state_store("failed to fetch roots", e))?;
        if !roots.is_initialized() {
            return Err(PeeringError::CaUninitialized);
        }

        let server_name = peering_server_san(&self.server.datacenter, &roots.trust_domain);
        let ca_pems = roots
            .roots
            .iter()
            .map(|root| ensure_trailing_newline(&root.root_cert))
            .collect();

        tracing::debug!(
            server_name = %server_name,
            roots = roots.roots.len(),
            generating_token,
            "derived peering TLS materials"
        );

        Ok(TlsMaterials {
            server_name,
            ca_pems,
        })
    }
}
