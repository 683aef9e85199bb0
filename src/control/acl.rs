//! ACL token resolution seam.
//!
//! Peering handlers need an authorizer for the caller's token but must not
//! depend on the concrete ACL subsystem. The proxy forwards the call and adds
//! nothing: no caching, no policy.

use crate::core::error::{BoxError, PeeringError, PeeringResult};
use std::sync::Arc;

/// Partition and namespace a request is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnterpriseMeta {
    pub partition: String,
    pub namespace: String,
}

impl EnterpriseMeta {
    /// Create scoping metadata.
    pub fn new(partition: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            namespace: namespace.into(),
        }
    }
}

/// Extra context handed to authorizer decisions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorizerContext {
    pub partition: String,
    pub namespace: String,
    pub peer: String,
}

/// Outcome of an ACL decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementDecision {
    Allow,
    Deny,
    /// No rule matched; the caller applies its default policy.
    Default,
}

/// Policy decisions used by peering handlers.
pub trait Authorizer: Send + Sync {
    fn peering_read(&self, ctx: &AuthorizerContext) -> EnforcementDecision;
    fn peering_write(&self, ctx: &AuthorizerContext) -> EnforcementDecision;
    fn service_write_any(&self, ctx: &AuthorizerContext) -> EnforcementDecision;
}

/// A resolved token.
#[derive(Clone)]
pub struct ResolveResult {
    /// Accessor id of the token (empty for anonymous).
    pub accessor_id: String,
    pub authorizer: Arc<dyn Authorizer>,
}

impl std::fmt::Debug for ResolveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveResult")
            .field("accessor_id", &self.accessor_id)
            .finish_non_exhaustive()
    }
}

/// The access-control subsystem.
pub trait AclResolver: Send + Sync {
    /// Resolve `token` into an authorizer, filling defaults into `ent_meta`
    /// and `authz_ctx`.
    fn resolve_token_and_default_meta(
        &self,
        token: &str,
        ent_meta: &mut EnterpriseMeta,
        authz_ctx: &mut AuthorizerContext,
    ) -> Result<ResolveResult, BoxError>;
}

/// Pure forwarder to an [`AclResolver`].
pub struct AuthResolverProxy {
    resolver: Arc<dyn AclResolver>,
}

impl AuthResolverProxy {
    pub fn new(resolver: Arc<dyn AclResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolve_token_and_default_meta(
        &self,
        token: &str,
        ent_meta: &mut EnterpriseMeta,
        authz_ctx: &mut AuthorizerContext,
    ) -> PeeringResult<ResolveResult> {
        self.resolver
            .resolve_token_and_default_meta(token, ent_meta, authz_ctx)
            .map_err(|source| PeeringError::Acl { source })
    }
}
