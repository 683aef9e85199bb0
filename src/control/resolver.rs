//! Server address resolution for peering tokens.
//!
//! A remote peer dials either our servers directly or our mesh gateways,
//! depending on the mesh config entry. The two paths are mutually exclusive.

use crate::control::catalog::{META_GRPC_PORT, META_GRPC_TLS_PORT};
use crate::control::state::StateReader;
use crate::core::error::{PeeringError, PeeringResult};
use crate::net::address::{format_address_port, parse_positive_port};
use crate::ops::observability::{metrics, MetricsRegistry};
use std::sync::Arc;

/// Resolves the dial targets a remote peer should use.
///
/// Addresses come back in catalog iteration order; no sort is applied.
pub struct ServerAddressResolver {
    state: Arc<dyn StateReader>,
    server_service_name: String,
    metrics: Arc<MetricsRegistry>,
}

impl ServerAddressResolver {
    /// Create a resolver reading server instances registered under
    /// `server_service_name`.
    pub fn new(
        state: Arc<dyn StateReader>,
        server_service_name: impl Into<String>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            state,
            server_service_name: server_service_name.into(),
            metrics,
        }
    }

    /// Resolve addresses for the topology selected by the mesh config.
    pub fn server_addresses(&self) -> PeeringResult<Vec<String>> {
        let mesh = self
            .state
            .mesh_config()
            .map_err(|e| PeeringError::state_store("failed to read mesh config entry", e))?;

        if mesh.is_some_and(|entry| entry.peers_through_mesh_gateways()) {
            self.mesh_gateway_addresses()
        } else {
            self.direct_server_addresses()
        }
    }

    /// WAN-preferred addresses of every healthy mesh gateway.
    pub fn mesh_gateway_addresses(&self) -> PeeringResult<Vec<String>> {
        let gateways = self
            .state
            .mesh_gateway_instances()
            .map_err(|e| PeeringError::state_store("failed to dump gateway addresses", e))?;

        let mut addrs = Vec::with_capacity(gateways.len());
        for gateway in &gateways {
            if !gateway.is_healthy() {
                self.metrics.counter_inc(metrics::RESOLVER_UNHEALTHY_GATEWAYS);
                continue;
            }
            let (addr, port) = gateway.best_address(true);
            addrs.push(format_address_port(addr, port));
        }

        if addrs.is_empty() {
            return Err(PeeringError::address_resolution(
                "servers are configured to PeerThroughMeshGateways, but no mesh gateway instances are registered",
            ));
        }
        tracing::debug!(count = addrs.len(), "resolved mesh gateway addresses");
        Ok(addrs)
    }

    /// gRPC addresses of every server, preferring the TLS port.
    ///
    /// Servers advertising neither port are skipped; only an empty result
    /// is an error.
    pub fn direct_server_addresses(&self) -> PeeringResult<Vec<String>> {
        let nodes = self
            .state
            .service_nodes(&self.server_service_name)
            .map_err(|e| PeeringError::state_store("failed to read server catalog", e))?;

        let mut addrs = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let port = [META_GRPC_TLS_PORT, META_GRPC_PORT].iter().find_map(|key| {
                node.service_meta
                    .get(*key)
                    .and_then(|value| parse_positive_port(value))
            });

            match port {
                Some(port) => addrs.push(format_address_port(&node.address, port)),
                None => {
                    self.metrics.counter_inc(metrics::RESOLVER_SKIPPED_SERVERS);
                    tracing::debug!(node = %node.node, "server has no gRPC port, skipping");
                }
            }
        }

        if addrs.is_empty() {
            return Err(PeeringError::address_resolution(
                "a grpc bind port must be specified in the configuration for all servers",
            ));
        }
        tracing::debug!(count = addrs.len(), "resolved server addresses");
        Ok(addrs)
    }
}
