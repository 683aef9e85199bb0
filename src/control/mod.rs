//! Peering control plane.
//!
//! - [`api`] - Replicated peering, CA and mesh config types
//! - [`catalog`] - Catalog snapshot types and best-address selection
//! - [`state`] - State store read seam
//! - [`leader`] - Leader address hint
//! - [`resolver`] - Server / mesh gateway address resolution
//! - [`token`] - Peering token codec
//! - [`apply`] - Commit log submission
//! - [`acl`] - ACL token resolution seam
//! - [`stream`] - Change-event subscriptions
//!
//! # Topology
//!
//! The mesh config entry selects how peers reach this cluster: directly via
//! each server's gRPC port, or through mesh gateways using their WAN
//! addresses. The two modes never mix within one resolution.

pub mod acl;
pub mod api;
pub mod apply;
pub mod catalog;
pub mod leader;
pub mod resolver;
pub mod state;
pub mod stream;
pub mod token;
