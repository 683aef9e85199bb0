//! The peering backend facade.
//!
//! [`PeeringBackend`] is the single object the two peering handlers depend
//! on. Each method calls exactly one collaborator and returns its result;
//! the only state held across calls is the leader address hint.
//!
//! ```text
//!   establishment handler        replication stream handler
//!            │                               │
//!   EstablishmentBackend               StreamBackend
//!            └──────────┬────────────────────┘
//!                  PeeringBackend
//!   ┌───────────┬───────┴──────┬────────────┬─────────────┐
//!  TLS       resolver      write gateway    ACL proxy    events
//!   │           │               │            │             │
//! StateReader  StateReader   LogWriter    AclResolver  EventPublisher
//! ```

use crate::control::acl::{
    AclResolver, AuthResolverProxy, AuthorizerContext, EnterpriseMeta, ResolveResult,
};
use crate::control::api::{
    DeregisterRequest, PeeringSecretsWriteRequest, PeeringTerminateByIdRequest,
    PeeringTrustBundleWriteRequest, PeeringWriteRequest, RegisterRequest,
};
use crate::control::apply::{ConsensusWriteGateway, LogWriter};
use crate::control::leader::LeaderAddressTracker;
use crate::control::resolver::ServerAddressResolver;
use crate::control::state::StateReader;
use crate::control::stream::{
    EventPublisher, EventStreamSubscriber, SubscribeRequest, Subscription,
};
use crate::control::token::{self, PeeringToken};
use crate::core::config::Config;
use crate::core::error::{PeeringError, PeeringResult};
use crate::net::tls::{TlsConfigurator, TlsMaterials, TlsMaterialsProvider};
use crate::ops::observability::{metrics, MetricsRegistry};
use std::sync::Arc;
use uuid::Uuid;

/// External collaborators the backend is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub state: Arc<dyn StateReader>,
    pub log: Arc<dyn LogWriter>,
    pub acl: Arc<dyn AclResolver>,
    pub publisher: Arc<dyn EventPublisher>,
    pub tls: Arc<dyn TlsConfigurator>,
}

/// Facade over the peering collaborators.
pub struct PeeringBackend {
    state: Arc<dyn StateReader>,
    leader: Arc<LeaderAddressTracker>,
    tls: TlsMaterialsProvider,
    resolver: ServerAddressResolver,
    writes: ConsensusWriteGateway,
    acl: AuthResolverProxy,
    events: EventStreamSubscriber,
    metrics: Arc<MetricsRegistry>,
    id_generation_attempts: u32,
}

impl PeeringBackend {
    /// Wire a backend from configuration and collaborators.
    ///
    /// `leader` is shared with the leadership-change observer.
    pub fn new(config: &Config, deps: Collaborators, leader: Arc<LeaderAddressTracker>) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        Self {
            tls: TlsMaterialsProvider::new(
                config.server.clone(),
                deps.tls.clone(),
                deps.state.clone(),
            ),
            resolver: ServerAddressResolver::new(
                deps.state.clone(),
                config.peering.server_service_name.clone(),
                metrics.clone(),
            ),
            writes: ConsensusWriteGateway::new(deps.log.clone(), metrics.clone()),
            acl: AuthResolverProxy::new(deps.acl.clone()),
            events: EventStreamSubscriber::new(deps.publisher.clone()),
            state: deps.state,
            leader,
            metrics,
            id_generation_attempts: config.peering.id_generation_attempts.max(1),
        }
    }

    /// Metrics recorded by this backend.
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// The shared leader hint.
    pub fn leader_tracker(&self) -> &Arc<LeaderAddressTracker> {
        &self.leader
    }

    /// Direct access to the state store for handler-side reads.
    pub fn store(&self) -> Arc<dyn StateReader> {
        self.state.clone()
    }

    // ------------------------------------------------------------------
    // Leadership
    // ------------------------------------------------------------------

    /// Record the address of a newly observed leader.
    pub fn set_leader_address(&self, addr: impl Into<String>) {
        let addr = addr.into();
        tracing::info!(addr = %addr, "peering leader address updated");
        self.leader.set(addr);
        self.metrics.counter_inc(metrics::LEADER_ADDRESS_UPDATES);
    }

    /// Best-effort hint for the leader's address; empty when unknown.
    pub fn leader_address(&self) -> String {
        self.leader.get()
    }

    pub fn is_leader(&self) -> bool {
        self.writes.is_leader()
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    /// Server name and CA roots a peer needs to trust this cluster.
    pub fn tls_materials(&self, generating_token: bool) -> PeeringResult<TlsMaterials> {
        self.tls.materials(generating_token)
    }

    /// Addresses a peer should dial.
    pub fn server_addresses(&self) -> PeeringResult<Vec<String>> {
        self.resolver.server_addresses()
    }

    pub fn encode_token(&self, token: &PeeringToken) -> PeeringResult<Vec<u8>> {
        token::encode_token(token)
    }

    pub fn decode_token(&self, raw: &[u8]) -> PeeringResult<PeeringToken> {
        token::decode_token(raw)
    }

    // ------------------------------------------------------------------
    // Identifiers and tenancy
    // ------------------------------------------------------------------

    /// Check that `id` is a UUID not yet used by any peering.
    pub fn check_peering_uuid(&self, id: &str) -> PeeringResult<bool> {
        parse_uuid("peering id", id)?;
        let existing = self
            .state
            .peering_read_by_id(id)
            .map_err(|e| PeeringError::state_store("failed to read peering", e))?;
        Ok(existing.is_none())
    }

    /// Check that `id` is a UUID not yet used by any peering secret.
    pub fn validate_proposed_peering_secret(&self, id: &str) -> PeeringResult<bool> {
        parse_uuid("peering secret", id)?;
        self.state
            .validate_proposed_peering_secret_uuid(id)
            .map_err(|e| PeeringError::state_store("failed to validate peering secret", e))
    }

    /// Generate a fresh peering id.
    pub fn generate_peering_id(&self) -> PeeringResult<String> {
        self.generate_unique("peering id", |id| self.check_peering_uuid(id))
    }

    /// Generate a fresh peering secret id.
    pub fn generate_peering_secret(&self) -> PeeringResult<String> {
        self.generate_unique("peering secret", |id| self.validate_proposed_peering_secret(id))
    }

    fn generate_unique<F>(&self, what: &str, is_free: F) -> PeeringResult<String>
    where
        F: Fn(&str) -> PeeringResult<bool>,
    {
        for _ in 0..self.id_generation_attempts {
            let candidate = Uuid::new_v4().to_string();
            if is_free(&candidate)? {
                return Ok(candidate);
            }
            tracing::debug!(candidate = %candidate, "{} collided, regenerating", what);
        }
        Err(PeeringError::validation(format!(
            "failed to generate a unique {} after {} attempts",
            what, self.id_generation_attempts
        )))
    }

    /// Only the default partition is supported.
    pub fn check_partition(&self, partition: &str) -> PeeringResult<()> {
        if is_default_tenancy(partition) {
            Ok(())
        } else {
            Err(PeeringError::validation("Partitions are an enterprise feature"))
        }
    }

    /// Only the default namespace is supported.
    pub fn check_namespace(&self, namespace: &str) -> PeeringResult<()> {
        if is_default_tenancy(namespace) {
            Ok(())
        } else {
            Err(PeeringError::validation("Namespaces are an enterprise feature"))
        }
    }

    // ------------------------------------------------------------------
    // Commit log writes
    // ------------------------------------------------------------------

    pub fn peering_secrets_write(&self, req: &PeeringSecretsWriteRequest) -> PeeringResult<()> {
        self.writes.peering_secrets_write(req)
    }

    pub fn peering_write(&self, req: &PeeringWriteRequest) -> PeeringResult<()> {
        self.writes.peering_write(req)
    }

    pub fn peering_terminate_by_id(&self, req: &PeeringTerminateByIdRequest) -> PeeringResult<()> {
        self.writes.peering_terminate_by_id(req)
    }

    pub fn peering_trust_bundle_write(
        &self,
        req: &PeeringTrustBundleWriteRequest,
    ) -> PeeringResult<()> {
        self.writes.peering_trust_bundle_write(req)
    }

    pub fn catalog_register(&self, req: &RegisterRequest) -> PeeringResult<()> {
        self.writes.catalog_register(req)
    }

    pub fn catalog_deregister(&self, req: &DeregisterRequest) -> PeeringResult<()> {
        self.writes.catalog_deregister(req)
    }

    // ------------------------------------------------------------------
    // ACL and events
    // ------------------------------------------------------------------

    pub fn resolve_token_and_default_meta(
        &self,
        token: &str,
        ent_meta: &mut EnterpriseMeta,
        authz_ctx: &mut AuthorizerContext,
    ) -> PeeringResult<ResolveResult> {
        self.acl.resolve_token_and_default_meta(token, ent_meta, authz_ctx)
    }

    pub fn subscribe(&self, request: SubscribeRequest) -> PeeringResult<Subscription> {
        self.events.subscribe(request)
    }
}

fn parse_uuid(what: &str, id: &str) -> PeeringResult<Uuid> {
    Uuid::parse_str(id)
        .map_err(|e| PeeringError::validation(format!("invalid {} {:?}: {}", what, id, e)))
}

fn is_default_tenancy(name: &str) -> bool {
    name.is_empty() || name.eq_ignore_ascii_case("default")
}

/// Operations shared by both peering handlers.
pub trait CommonBackend: Send + Sync {
    fn is_leader(&self) -> bool;
    fn leader_address(&self) -> String;
    fn validate_proposed_peering_secret(&self, id: &str) -> PeeringResult<bool>;
    fn peering_secrets_write(&self, req: &PeeringSecretsWriteRequest) -> PeeringResult<()>;
    fn resolve_token_and_default_meta(
        &self,
        token: &str,
        ent_meta: &mut EnterpriseMeta,
        authz_ctx: &mut AuthorizerContext,
    ) -> PeeringResult<ResolveResult>;
}

/// What the token generation / establishment handler needs.
pub trait EstablishmentBackend: CommonBackend {
    fn store(&self) -> Arc<dyn StateReader>;
    fn check_partition(&self, partition: &str) -> PeeringResult<()>;
    fn check_namespace(&self, namespace: &str) -> PeeringResult<()>;
    fn tls_materials(&self, generating_token: bool) -> PeeringResult<TlsMaterials>;
    fn server_addresses(&self) -> PeeringResult<Vec<String>>;
    fn encode_token(&self, token: &PeeringToken) -> PeeringResult<Vec<u8>>;
    fn decode_token(&self, raw: &[u8]) -> PeeringResult<PeeringToken>;
    fn check_peering_uuid(&self, id: &str) -> PeeringResult<bool>;
    fn generate_peering_id(&self) -> PeeringResult<String>;
    fn generate_peering_secret(&self) -> PeeringResult<String>;
    fn peering_write(&self, req: &PeeringWriteRequest) -> PeeringResult<()>;
}

/// What the replication stream handler needs.
pub trait StreamBackend: CommonBackend {
    fn subscribe(&self, request: SubscribeRequest) -> PeeringResult<Subscription>;
    fn peering_terminate_by_id(&self, req: &PeeringTerminateByIdRequest) -> PeeringResult<()>;
    fn peering_trust_bundle_write(&self, req: &PeeringTrustBundleWriteRequest)
        -> PeeringResult<()>;
    fn catalog_register(&self, req: &RegisterRequest) -> PeeringResult<()>;
    fn catalog_deregister(&self, req: &DeregisterRequest) -> PeeringResult<()>;
}

impl CommonBackend for PeeringBackend {
    fn is_leader(&self) -> bool {
        PeeringBackend::is_leader(self)
    }

    fn leader_address(&self) -> String {
        PeeringBackend::leader_address(self)
    }

    fn validate_proposed_peering_secret(&self, id: &str) -> PeeringResult<bool> {
        PeeringBackend::validate_proposed_peering_secret(self, id)
    }

    fn peering_secrets_write(&self, req: &PeeringSecretsWriteRequest) -> PeeringResult<()> {
        PeeringBackend::peering_secrets_write(self, req)
    }

    fn resolve_token_and_default_meta(
        &self,
        token: &str,
        ent_meta: &mut EnterpriseMeta,
        authz_ctx: &mut AuthorizerContext,
    ) -> PeeringResult<ResolveResult> {
        PeeringBackend::resolve_token_and_default_meta(self, token, ent_meta, authz_ctx)
    }
}

impl EstablishmentBackend for PeeringBackend {
    fn store(&self) -> Arc<dyn StateReader> {
        PeeringBackend::store(self)
    }

    fn check_partition(&self, partition: &str) -> PeeringResult<()> {
        PeeringBackend::check_partition(self, partition)
    }

    fn check_namespace(&self, namespace: &str) -> PeeringResult<()> {
        PeeringBackend::check_namespace(self, namespace)
    }

    fn tls_materials(&self, generating_token: bool) -> PeeringResult<TlsMaterials> {
        PeeringBackend::tls_materials(self, generating_token)
    }

    fn server_addresses(&self) -> PeeringResult<Vec<String>> {
        PeeringBackend::server_addresses(self)
    }

    fn encode_token(&self, token: &PeeringToken) -> PeeringResult<Vec<u8>> {
        PeeringBackend::encode_token(self, token)
    }

    fn decode_token(&self, raw: &[u8]) -> PeeringResult<PeeringToken> {
        PeeringBackend::decode_token(self, raw)
    }

    fn check_peering_uuid(&self, id: &str) -> PeeringResult<bool> {
        PeeringBackend::check_peering_uuid(self, id)
    }

    fn generate_peering_id(&self) -> PeeringResult<String> {
        PeeringBackend::generate_peering_id(self)
    }

    fn generate_peering_secret(&self) -> PeeringResult<String> {
        PeeringBackend::generate_peering_secret(self)
    }

    fn peering_write(&self, req: &PeeringWriteRequest) -> PeeringResult<()> {
        PeeringBackend::peering_write(self, req)
    }
}

impl StreamBackend for PeeringBackend {
    fn subscribe(&self, request: SubscribeRequest) -> PeeringResult<Subscription> {
        PeeringBackend::subscribe(self, request)
    }

    fn peering_terminate_by_id(&self, req: &PeeringTerminateByIdRequest) -> PeeringResult<()> {
        PeeringBackend::peering_terminate_by_id(self, req)
    }

    fn peering_trust_bundle_write(
        &self,
        req: &PeeringTrustBundleWriteRequest,
    ) -> PeeringResult<()> {
        PeeringBackend::peering_trust_bundle_write(self, req)
    }

    fn catalog_register(&self, req: &RegisterRequest) -> PeeringResult<()> {
        PeeringBackend::catalog_register(self, req)
    }

    fn catalog_deregister(&self, req: &DeregisterRequest) -> PeeringResult<()> {
        PeeringBackend::catalog_deregister(self, req)
    }
}
