//! Networking helpers.
//!
//! - [`address`] - `host:port` formatting and port validation
//! - [`tls`] - Peering TLS materials (server SAN, CA roots)

pub mod address;
pub mod tls;
