//! Peering backend - control-plane adapter for cluster peering.
//!
//! Cluster peering lets two independent clusters exchange service data. The
//! handlers that issue peering tokens, establish peerings and stream
//! replicated data all reach the local cluster through one facade,
//! [`backend::PeeringBackend`], which mediates access to the replicated
//! state store, the commit log, the ACL subsystem, the CA and the
//! change-event stream.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Peering Handlers                          │
//! │     token generation / establishment  │  replication stream     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        PeeringBackend                           │
//! │  leader hint │ TLS materials │ address resolver │ token codec   │
//! │  consensus write gateway │ ACL proxy │ event subscriptions      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     External Collaborators                      │
//! │  StateReader │ LogWriter │ AclResolver │ EventPublisher │ TLS   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! ## Core
//! - [`core::config`] - Configuration parsing and validation
//! - [`core::error`] - Error types
//!
//! ## Control Plane
//! - [`control::leader`] - Leader address hint
//! - [`control::resolver`] - Server and mesh gateway address resolution
//! - [`control::token`] - Peering token codec
//! - [`control::apply`] - Commit log submission
//! - [`control::acl`] - ACL resolution seam
//! - [`control::stream`] - Change-event subscriptions
//!
//! ## Networking
//! - [`net::tls`] - Peering TLS materials
//! - [`net::address`] - Address formatting
//!
//! ## Operations
//! - [`ops::observability`] - Metrics
//!
//! # Key Invariants
//!
//! - Token generation requires connect, gRPC TLS and an initialized CA
//! - Address resolution never mixes server and mesh gateway addresses
//! - Every mutation is exactly one commit log entry; no retries
//! - The leader hint is the only state held across calls

// Core infrastructure
pub mod core;

// Control plane
pub mod control;

// Facade
pub mod backend;

// Networking
pub mod net;

// Operations and observability
pub mod ops;

// CLI
pub mod cli;

// Re-exports for convenience
pub use self::backend::{
    Collaborators, CommonBackend, EstablishmentBackend, PeeringBackend, StreamBackend,
};
pub use self::core::{config, error};
pub use control::{acl, api, apply, catalog, leader, resolver, state, stream, token};
pub use net::tls;
pub use ops::observability;
