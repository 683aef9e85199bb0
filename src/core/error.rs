//! Error types for the peering backend.
//!
//! Every collaborator failure is carried as a boxed source so callers see the
//! original cause verbatim. The backend wraps errors with the failing
//! operation but never retries or recovers on its own.

use thiserror::Error;

/// Opaque error returned by external collaborators (state store, commit log,
/// ACL resolver, event publisher).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Peering backend error conditions.
#[derive(Debug, Error)]
pub enum PeeringError {
    /// A server precondition is not satisfied (connect disabled, gRPC TLS off).
    #[error("{message}")]
    Configuration { message: String },

    /// The CA has no roots yet or no trust domain.
    #[error("CA has not finished initializing")]
    CaUninitialized,

    /// No dial target could be produced for the current topology.
    #[error("{message}")]
    AddressResolution { message: String },

    /// The token's text-safe wrapping is malformed.
    #[error("failed to decode token: {source}")]
    Decode {
        #[source]
        source: base64::DecodeError,
    },

    /// The token payload could not be parsed or is structurally incomplete.
    #[error("malformed token payload: {message}")]
    Structure { message: String },

    /// The commit log rejected or failed to apply an entry.
    #[error("{operation} failed: {source}")]
    ConsensusWrite {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// A request failed validation (bad UUID, unsupported tenancy, ...).
    #[error("{message}")]
    Validation { message: String },

    /// A state store read failed.
    #[error("{context}: {source}")]
    StateStore {
        context: &'static str,
        #[source]
        source: BoxError,
    },

    /// ACL token resolution failed.
    #[error("failed to resolve ACL token: {source}")]
    Acl {
        #[source]
        source: BoxError,
    },

    /// The event publisher refused the subscription.
    #[error("failed to subscribe to event stream: {source}")]
    Subscribe {
        #[source]
        source: BoxError,
    },

    /// The subscription was closed by either side.
    #[error("subscription closed")]
    SubscriptionClosed,
}

impl PeeringError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an address resolution error.
    pub fn address_resolution(message: impl Into<String>) -> Self {
        Self::AddressResolution {
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a structural codec error.
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure {
            message: message.into(),
        }
    }

    /// Wrap a state store failure.
    pub fn state_store(context: &'static str, source: BoxError) -> Self {
        Self::StateStore { context, source }
    }

    /// Wrap a commit log failure for the named operation.
    pub fn consensus_write(operation: &'static str, source: BoxError) -> Self {
        Self::ConsensusWrite { operation, source }
    }

    /// Check whether a caller may reasonably retry after backoff.
    ///
    /// Configuration, codec and validation failures are terminal for the
    /// request; CA initialization and log submission can succeed later.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::CaUninitialized | Self::ConsensusWrite { .. } | Self::StateStore { .. }
        )
    }

    /// Check if the error was caused by invalid caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::Structure { .. } | Self::Validation { .. }
        )
    }
}

/// Result type using PeeringError.
pub type PeeringResult<T> = Result<T, PeeringError>;
