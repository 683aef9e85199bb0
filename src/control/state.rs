//! Read-only view of the replicated state store.

use crate::control::api::{CaRoots, MeshConfigEntry, PeeringRecord};
use crate::control::catalog::{CheckServiceNode, ServiceNode};
use crate::core::error::BoxError;

/// Point-in-time reads the peering backend needs from the state store.
///
/// Implementations return snapshots; the backend never caches or mutates
/// them.
pub trait StateReader: Send + Sync {
    /// Current CA roots and trust domain.
    fn ca_roots(&self) -> Result<CaRoots, BoxError>;

    /// The mesh config entry, if one has been written.
    fn mesh_config(&self) -> Result<Option<MeshConfigEntry>, BoxError>;

    /// Every registered mesh gateway instance in the local cluster, with its
    /// node and health checks.
    fn mesh_gateway_instances(&self) -> Result<Vec<CheckServiceNode>, BoxError>;

    /// Every local instance of the named service.
    fn service_nodes(&self, service: &str) -> Result<Vec<ServiceNode>, BoxError>;

    /// Look up a peering by id.
    fn peering_read_by_id(&self, id: &str) -> Result<Option<PeeringRecord>, BoxError>;

    /// Check that a proposed peering secret id is not already in use.
    fn validate_proposed_peering_secret_uuid(&self, id: &str) -> Result<bool, BoxError>;
}
