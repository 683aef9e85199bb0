//! Replicated state types used by the peering backend.
//!
//! These mirror what the consensus-backed state store holds for peering:
//! - Peering records, secrets and trust bundles
//! - CA roots with their trust domain
//! - The mesh config entry that selects the address topology
//! - Catalog register/deregister requests written on behalf of peers
//!
//! The state store is the source of truth; the backend only reads snapshots
//! of these types or submits them as write payloads.

use crate::control::catalog::{HealthCheck, Node, NodeService};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle state of a peering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeeringState {
    #[default]
    Undefined,
    /// Token generated, waiting for the dialer to establish.
    Pending,
    /// Dialer is establishing the stream.
    Establishing,
    /// Replication stream is up.
    Active,
    /// Replication stream is erroring.
    Failing,
    /// Marked for deletion; resources are being cleaned up.
    Deleting,
    /// The peer terminated the peering.
    Terminated,
}

impl PeeringState {
    /// Check if the peering is being or has been torn down.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deleting | Self::Terminated)
    }
}

/// A peering relationship with another cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeeringRecord {
    /// Locally unique peering id (UUID).
    pub id: String,

    /// Operator-chosen peer name.
    pub name: String,

    /// Local partition the peering belongs to.
    #[serde(default)]
    pub partition: String,

    /// Arbitrary operator metadata.
    #[serde(default)]
    pub meta: HashMap<String, String>,

    pub state: PeeringState,

    /// The id the remote cluster uses for this peering.
    #[serde(default)]
    pub peer_id: String,

    /// CA PEMs the remote presented.
    #[serde(default)]
    pub peer_ca_pems: Vec<String>,

    /// SAN to validate when dialing the remote.
    #[serde(default)]
    pub peer_server_name: String,

    /// Addresses to dial the remote on.
    #[serde(default)]
    pub peer_server_addresses: Vec<String>,

    /// Deletion timestamp (ms since epoch), set when state is Deleting.
    #[serde(default)]
    pub deleted_at_ms: Option<u64>,

    #[serde(default)]
    pub create_index: u64,

    #[serde(default)]
    pub modify_index: u64,
}

impl PeeringRecord {
    /// Create a pending peering.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: PeeringState::Pending,
            ..Default::default()
        }
    }

    /// Whether this peering was initiated by dialing a remote token.
    pub fn should_dial(&self) -> bool {
        !self.peer_server_addresses.is_empty()
    }
}

/// Secret lifecycle operation carried by a secrets write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretOperation {
    /// A new establishment secret was generated with a token.
    Generate,
    /// A pending stream secret replaced an establishment secret.
    Exchange,
    /// A pending stream secret was promoted to active.
    Promote,
    /// The dialer stored the secret it was handed.
    Establish,
}

/// Stream secrets for a peering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamSecrets {
    #[serde(default)]
    pub active_secret_id: String,
    #[serde(default)]
    pub pending_secret_id: String,
}

/// All secrets held for a single peering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeeringSecrets {
    pub peer_id: String,
    #[serde(default)]
    pub establishment_secret_id: Option<String>,
    #[serde(default)]
    pub stream: StreamSecrets,
}

/// Write request for peering secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeeringSecretsWriteRequest {
    pub operation: SecretOperation,
    pub secrets: PeeringSecrets,
}

/// Write request for a peering record, optionally with its secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeeringWriteRequest {
    pub peering: PeeringRecord,
    #[serde(default)]
    pub secrets_request: Option<PeeringSecretsWriteRequest>,
}

/// Marks a peering terminated by id (the remote ended it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeeringTerminateByIdRequest {
    pub id: String,
}

/// A peer's CA roots and trust domain, imported for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeeringTrustBundle {
    pub trust_domain: String,
    pub peer_name: String,
    #[serde(default)]
    pub partition: String,
    pub root_pems: Vec<String>,
    #[serde(default)]
    pub export_partition: String,
    #[serde(default)]
    pub create_index: u64,
    #[serde(default)]
    pub modify_index: u64,
}

/// Write request for a peer trust bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeeringTrustBundleWriteRequest {
    pub bundle: PeeringTrustBundle,
}

/// Catalog registration of imported nodes, services and checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub datacenter: String,
    pub node: Node,
    #[serde(default)]
    pub service: Option<NodeService>,
    #[serde(default)]
    pub checks: Vec<HealthCheck>,
    /// Peer the registration was imported from.
    #[serde(default)]
    pub peer_name: String,
    /// Leave an existing node untouched.
    #[serde(default)]
    pub skip_node_update: bool,
}

/// Catalog deregistration of an imported node, service or check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeregisterRequest {
    pub datacenter: String,
    pub node: String,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub check_id: Option<String>,
    #[serde(default)]
    pub peer_name: String,
}

/// A CA root certificate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaRoot {
    pub id: String,
    pub name: String,
    /// PEM encoded root certificate.
    pub root_cert: String,
    #[serde(default)]
    pub active: bool,
}

/// The cluster's CA roots and trust domain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaRoots {
    pub roots: Vec<CaRoot>,
    /// Trust domain (e.g. `<cluster-id>.consul`); empty until initialized.
    pub trust_domain: String,
    #[serde(default)]
    pub active_root_id: String,
}

impl CaRoots {
    /// Check if the CA has finished initializing.
    pub fn is_initialized(&self) -> bool {
        !self.roots.is_empty() && !self.trust_domain.is_empty()
    }
}

/// Peering section of the mesh config entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeeringMeshConfig {
    /// Route peering control traffic through mesh gateways.
    #[serde(default)]
    pub peer_through_mesh_gateways: bool,
}

/// The cluster-wide mesh config entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeshConfigEntry {
    #[serde(default)]
    pub peering: Option<PeeringMeshConfig>,
}

impl MeshConfigEntry {
    /// Mesh config that routes peering through gateways.
    pub fn peer_through_mesh_gateways() -> Self {
        Self {
            peering: Some(PeeringMeshConfig {
                peer_through_mesh_gateways: true,
            }),
        }
    }

    /// Check if peering traffic must go through mesh gateways.
    pub fn peers_through_mesh_gateways(&self) -> bool {
        self.peering
            .as_ref()
            .is_some_and(|p| p.peer_through_mesh_gateways)
    }
}
