//! Catalog snapshot types read from the state store.
//!
//! Service metadata values are untyped strings; consumers must validate
//! them before use.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tagged address key for the WAN-facing address.
pub const TAGGED_ADDRESS_WAN: &str = "wan";

/// Service metadata key holding the TLS gRPC port of a server.
pub const META_GRPC_TLS_PORT: &str = "grpc_tls_port";

/// Service metadata key holding the plaintext gRPC port of a server.
pub const META_GRPC_PORT: &str = "grpc_port";

/// Kind of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// Ordinary service.
    #[default]
    Typical,
    /// Mesh gateway relaying traffic between clusters.
    MeshGateway,
    /// Terminating gateway.
    TerminatingGateway,
    /// Ingress gateway.
    IngressGateway,
    /// Sidecar proxy.
    ConnectProxy,
}

/// An address and port pair tagged onto a service (e.g. "wan").
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceAddress {
    pub address: String,
    pub port: u16,
}

/// A catalog node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    /// Node name.
    pub name: String,
    /// LAN address.
    pub address: String,
    /// Alternate addresses keyed by tag ("lan", "wan", ...).
    #[serde(default)]
    pub tagged_addresses: HashMap<String, String>,
}

impl Node {
    /// Pick the node address, preferring the WAN tag when `wan` is set.
    pub fn best_address(&self, wan: bool) -> &str {
        if wan {
            if let Some(addr) = self.tagged_addresses.get(TAGGED_ADDRESS_WAN) {
                return addr;
            }
        }
        &self.address
    }
}

/// A service instance registered on a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeService {
    pub kind: ServiceKind,
    pub id: String,
    pub service: String,
    /// Service address; empty means "use the node address".
    #[serde(default)]
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub tagged_addresses: HashMap<String, ServiceAddress>,
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

impl NodeService {
    /// Pick the service address and port, preferring the WAN tag when `wan`
    /// is set. A tagged port of zero keeps the service port.
    pub fn best_address(&self, wan: bool) -> (&str, u16) {
        let mut addr = self.address.as_str();
        let mut port = self.port;
        if wan {
            if let Some(tagged) = self.tagged_addresses.get(TAGGED_ADDRESS_WAN) {
                addr = &tagged.address;
                if tagged.port != 0 {
                    port = tagged.port;
                }
            }
        }
        (addr, port)
    }
}

/// Health check status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Passing,
    Warning,
    Critical,
}

/// A health check attached to a node or service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthCheck {
    pub node: String,
    pub check_id: String,
    pub name: String,
    pub status: HealthStatus,
    /// Empty for node-level checks.
    #[serde(default)]
    pub service_id: String,
}

/// A service instance together with its node and health checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckServiceNode {
    pub node: Node,
    pub service: NodeService,
    #[serde(default)]
    pub checks: Vec<HealthCheck>,
}

impl CheckServiceNode {
    /// Resolve the best dialable address and port.
    ///
    /// With `wan`: service WAN tag, service address, node WAN tag, node
    /// address. Without: service address, node address.
    pub fn best_address(&self, wan: bool) -> (&str, u16) {
        let (addr, port) = self.service.best_address(wan);
        if addr.is_empty() {
            (self.node.best_address(wan), port)
        } else {
            (addr, port)
        }
    }

    /// An instance is healthy unless one of its checks is critical.
    pub fn is_healthy(&self) -> bool {
        !self
            .checks
            .iter()
            .any(|check| check.status == HealthStatus::Critical)
    }
}

/// Flattened view of a service instance, as returned by service lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceNode {
    /// Node name.
    pub node: String,
    /// Node address.
    pub address: String,
    pub service_id: String,
    pub service_name: String,
    #[serde(default)]
    pub service_meta: HashMap<String, String>,
}

impl ServiceNode {
    /// Create a service node with no metadata.
    pub fn new(node: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            address: address.into(),
            ..Default::default()
        }
    }

    /// Add a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.service_meta.insert(key.into(), value.into());
        self
    }
}
