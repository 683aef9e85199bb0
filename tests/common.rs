//! Common test utilities.
//!
//! In-memory fakes for every collaborator the peering backend talks to.
//! Import with `mod common;` in test files.

#![allow(dead_code)]

use parking_lot::Mutex;
use peering_backend::acl::{
    AclResolver, Authorizer, AuthorizerContext, EnforcementDecision, EnterpriseMeta,
    ResolveResult,
};
use peering_backend::api::{CaRoot, CaRoots, MeshConfigEntry, PeeringRecord};
use peering_backend::apply::{LogEntry, LogWriter};
use peering_backend::catalog::{
    CheckServiceNode, HealthCheck, HealthStatus, Node, NodeService, ServiceKind, ServiceNode,
    META_GRPC_PORT, META_GRPC_TLS_PORT,
};
use peering_backend::config::{Config, ServerConfig};
use peering_backend::error::BoxError;
use peering_backend::leader::LeaderAddressTracker;
use peering_backend::stream::{EventPublisher, EventSink, SubscribeRequest, Subscription};
use peering_backend::tls::TlsConfigurator;
use peering_backend::{Collaborators, PeeringBackend};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const TRUST_DOMAIN: &str = "11111111-2222-3333-4444-555555555555.consul";
pub const ROOT_PEM: &str = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----";

// ============================================================================
// State store
// ============================================================================

/// Mutable in-memory state store.
#[derive(Default)]
pub struct MemoryState {
    pub roots: Mutex<CaRoots>,
    pub mesh: Mutex<Option<MeshConfigEntry>>,
    pub gateways: Mutex<Vec<CheckServiceNode>>,
    pub services: Mutex<HashMap<String, Vec<ServiceNode>>>,
    pub peerings: Mutex<HashMap<String, PeeringRecord>>,
    pub used_secrets: Mutex<HashSet<String>>,
    /// Reject every id probe, forcing generators to exhaust their attempts.
    pub reject_all_ids: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MemoryState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// State with an initialized CA holding one root.
    pub fn with_ca() -> Arc<Self> {
        let state = Self::new();
        state.set_roots(vec![ROOT_PEM], TRUST_DOMAIN);
        state
    }

    pub fn set_roots(&self, pems: Vec<&str>, trust_domain: &str) {
        let roots = pems
            .iter()
            .enumerate()
            .map(|(i, pem)| CaRoot {
                id: format!("root-{}", i),
                name: format!("Root {}", i),
                root_cert: pem.to_string(),
                active: i == 0,
            })
            .collect();
        *self.roots.lock() = CaRoots {
            roots,
            trust_domain: trust_domain.to_string(),
            active_root_id: "root-0".to_string(),
        };
    }

    pub fn enable_mesh_gateways(&self) {
        *self.mesh.lock() = Some(MeshConfigEntry::peer_through_mesh_gateways());
    }

    pub fn add_gateway(&self, gateway: CheckServiceNode) {
        self.gateways.lock().push(gateway);
    }

    pub fn add_server(&self, node: ServiceNode) {
        self.services
            .lock()
            .entry("consul".to_string())
            .or_default()
            .push(node);
    }

    pub fn insert_peering(&self, peering: PeeringRecord) {
        self.peerings.lock().insert(peering.id.clone(), peering);
    }

    pub fn mark_secret_used(&self, id: &str) {
        self.used_secrets.lock().insert(id.to_string());
    }

    fn check_reads(&self) -> Result<(), BoxError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err("state store unavailable".into());
        }
        Ok(())
    }
}

impl peering_backend::state::StateReader for MemoryState {
    fn ca_roots(&self) -> Result<CaRoots, BoxError> {
        self.check_reads()?;
        Ok(self.roots.lock().clone())
    }

    fn mesh_config(&self) -> Result<Option<MeshConfigEntry>, BoxError> {
        self.check_reads()?;
        Ok(self.mesh.lock().clone())
    }

    fn mesh_gateway_instances(&self) -> Result<Vec<CheckServiceNode>, BoxError> {
        self.check_reads()?;
        Ok(self.gateways.lock().clone())
    }

    fn service_nodes(&self, service: &str) -> Result<Vec<ServiceNode>, BoxError> {
        self.check_reads()?;
        Ok(self.services.lock().get(service).cloned().unwrap_or_default())
    }

    fn peering_read_by_id(&self, id: &str) -> Result<Option<PeeringRecord>, BoxError> {
        self.check_reads()?;
        if self.reject_all_ids.load(Ordering::SeqCst) {
            return Ok(Some(PeeringRecord::new(id, "taken")));
        }
        Ok(self.peerings.lock().get(id).cloned())
    }

    fn validate_proposed_peering_secret_uuid(&self, id: &str) -> Result<bool, BoxError> {
        self.check_reads()?;
        if self.reject_all_ids.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(!self.used_secrets.lock().contains(id))
    }
}

// ============================================================================
// Commit log
// ============================================================================

/// Commit log that records entries and can be told to reject them.
#[derive(Default)]
pub struct RecordingLog {
    pub entries: Mutex<Vec<LogEntry>>,
    pub fail_with: Mutex<Option<String>>,
    pub leader: AtomicBool,
    next_index: AtomicU64,
}

impl RecordingLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock() = Some(message.to_string());
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl LogWriter for RecordingLog {
    fn apply(&self, entry: LogEntry) -> Result<u64, BoxError> {
        if let Some(message) = self.fail_with.lock().clone() {
            return Err(message.into());
        }
        self.entries.lock().push(entry);
        Ok(self.next_index.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_leader(&self) -> bool {
        self.leader.load(Ordering::SeqCst)
    }
}

// ============================================================================
// ACL
// ============================================================================

/// Authorizer that returns the same decision for everything.
pub struct FixedAuthorizer(pub EnforcementDecision);

impl Authorizer for FixedAuthorizer {
    fn peering_read(&self, _ctx: &AuthorizerContext) -> EnforcementDecision {
        self.0
    }

    fn peering_write(&self, _ctx: &AuthorizerContext) -> EnforcementDecision {
        self.0
    }

    fn service_write_any(&self, _ctx: &AuthorizerContext) -> EnforcementDecision {
        self.0
    }
}

/// Resolver that accepts one token and fills in default tenancy.
pub struct StaticAcl {
    pub token: String,
    pub calls: Mutex<Vec<String>>,
}

impl StaticAcl {
    pub fn new(token: &str) -> Arc<Self> {
        Arc::new(Self {
            token: token.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }
}

impl AclResolver for StaticAcl {
    fn resolve_token_and_default_meta(
        &self,
        token: &str,
        ent_meta: &mut EnterpriseMeta,
        authz_ctx: &mut AuthorizerContext,
    ) -> Result<ResolveResult, BoxError> {
        self.calls.lock().push(token.to_string());
        if token != self.token {
            return Err("ACL not found".into());
        }
        if ent_meta.partition.is_empty() {
            ent_meta.partition = "default".to_string();
        }
        if ent_meta.namespace.is_empty() {
            ent_meta.namespace = "default".to_string();
        }
        authz_ctx.partition = ent_meta.partition.clone();
        authz_ctx.namespace = ent_meta.namespace.clone();
        Ok(ResolveResult {
            accessor_id: "accessor-1".to_string(),
            authorizer: Arc::new(FixedAuthorizer(EnforcementDecision::Allow)),
        })
    }
}

// ============================================================================
// Event publisher
// ============================================================================

/// Publisher that hands out channels and keeps the sinks for the test.
#[derive(Default)]
pub struct ChannelPublisher {
    pub sinks: Mutex<Vec<(SubscribeRequest, EventSink)>>,
    pub refuse: AtomicBool,
}

impl ChannelPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sink(&self, i: usize) -> EventSink {
        self.sinks.lock()[i].1.clone()
    }
}

impl EventPublisher for ChannelPublisher {
    fn subscribe(&self, request: SubscribeRequest) -> Result<Subscription, BoxError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err("publisher is shutting down".into());
        }
        let (sink, subscription) = Subscription::channel(request.clone());
        self.sinks.lock().push((request, sink));
        Ok(subscription)
    }
}

// ============================================================================
// TLS
// ============================================================================

/// TLS configurator with a fixed answer.
pub struct StaticTls(pub bool);

impl TlsConfigurator for StaticTls {
    fn grpc_server_use_tls(&self) -> bool {
        self.0
    }
}

// ============================================================================
// Wiring
// ============================================================================

/// A backend wired to fakes, with handles to each fake.
pub struct Harness {
    pub backend: PeeringBackend,
    pub state: Arc<MemoryState>,
    pub log: Arc<RecordingLog>,
    pub acl: Arc<StaticAcl>,
    pub publisher: Arc<ChannelPublisher>,
}

/// Server config that satisfies token generation preconditions.
pub fn token_ready_server() -> ServerConfig {
    ServerConfig::new("dc1")
        .with_connect(true)
        .with_grpc_tls_port(8503)
}

pub fn harness(server: ServerConfig, state: Arc<MemoryState>) -> Harness {
    harness_with_config(Config::new(server), state, false)
}

pub fn harness_with_config(config: Config, state: Arc<MemoryState>, use_tls: bool) -> Harness {
    let log = RecordingLog::new();
    let acl = StaticAcl::new("secret-token");
    let publisher = ChannelPublisher::new();
    let deps = Collaborators {
        state: state.clone(),
        log: log.clone(),
        acl: acl.clone(),
        publisher: publisher.clone(),
        tls: Arc::new(StaticTls(use_tls)),
    };
    let backend = PeeringBackend::new(&config, deps, Arc::new(LeaderAddressTracker::new()));
    Harness {
        backend,
        state,
        log,
        acl,
        publisher,
    }
}

// ============================================================================
// Catalog builders
// ============================================================================

/// A server catalog entry with optional gRPC port metadata.
pub fn server_node(name: &str, addr: &str, tls_port: Option<&str>, port: Option<&str>) -> ServiceNode {
    let mut node = ServiceNode::new(name, addr);
    node.service_id = "consul".to_string();
    node.service_name = "consul".to_string();
    if let Some(p) = tls_port {
        node = node.with_meta(META_GRPC_TLS_PORT, p);
    }
    if let Some(p) = port {
        node = node.with_meta(META_GRPC_PORT, p);
    }
    node
}

/// A mesh gateway whose only address is the node address.
pub fn mesh_gateway(node_addr: &str, port: u16) -> CheckServiceNode {
    CheckServiceNode {
        node: Node {
            name: format!("node-{}", node_addr),
            address: node_addr.to_string(),
            tagged_addresses: HashMap::new(),
        },
        service: NodeService {
            kind: ServiceKind::MeshGateway,
            id: "mesh-gateway".to_string(),
            service: "mesh-gateway".to_string(),
            port,
            ..Default::default()
        },
        checks: Vec::new(),
    }
}

pub fn with_check(mut gateway: CheckServiceNode, status: HealthStatus) -> CheckServiceNode {
    gateway.checks.push(HealthCheck {
        node: gateway.node.name.clone(),
        check_id: "serfHealth".to_string(),
        name: "Serf Health Status".to_string(),
        status,
        service_id: String::new(),
    });
    gateway
}

// ============================================================================
// Config files
// ============================================================================

/// Create a minimal valid configuration file.
pub fn create_minimal_config() -> NamedTempFile {
    write_config(
        r#"
[server]
datacenter = "dc1"
"#,
    )
}

/// Create a configuration with every section set.
pub fn create_full_config(datacenter: &str, grpc_tls_port: i32, log_level: &str) -> NamedTempFile {
    write_config(&format!(
        r#"
[server]
datacenter = "{}"
connect_enabled = true
grpc_port = 8502
grpc_tls_port = {}

[tls]
grpc_use_tls = true

[peering]
server_service_name = "consul"
id_generation_attempts = 3

[telemetry]
log_level = "{}"
"#,
        datacenter, grpc_tls_port, log_level
    ))
}

pub fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}
