//! Core module tests: configuration and errors.

mod common;

use common::*;
use peering_backend::config::{Config, ConfigOverrides};
use peering_backend::error::PeeringError;
use peering_backend::tls::TlsConfigurator;

// ============================================================================
// Config loading
// ============================================================================

#[test]
fn minimal_config_loads_with_defaults() {
    let file = create_minimal_config();
    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.server.datacenter, "dc1");
    assert!(!config.server.connect_enabled);
    assert_eq!(config.server.grpc_port, 0);
    assert_eq!(config.server.grpc_tls_port, 0);
    assert!(!config.grpc_server_use_tls());
    assert_eq!(config.peering.server_service_name, "consul");
    assert_eq!(config.peering.id_generation_attempts, 5);
    assert_eq!(config.telemetry.log_level, "info");
}

#[test]
fn full_config_loads() {
    let file = create_full_config("east", 8503, "debug");
    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.server.datacenter, "east");
    assert!(config.server.connect_enabled);
    assert_eq!(config.server.grpc_port, 8502);
    assert_eq!(config.server.grpc_tls_port, 8503);
    assert!(config.grpc_server_use_tls());
    assert_eq!(config.peering.id_generation_attempts, 3);
    assert_eq!(config.telemetry.log_level, "debug");
}

#[test]
fn missing_file_is_an_error() {
    let err = Config::from_file(std::path::Path::new("/nonexistent/peering.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn missing_server_section_is_rejected() {
    assert!(Config::from_toml("[telemetry]\nlog_level = \"info\"\n").is_err());
}

// ============================================================================
// Config validation
// ============================================================================

#[test]
fn empty_datacenter_is_rejected() {
    let err = Config::from_toml("[server]\ndatacenter = \"\"\n").unwrap_err();
    assert!(err.to_string().contains("server.datacenter"));
}

#[test]
fn dotted_datacenter_is_rejected() {
    let err = Config::from_toml("[server]\ndatacenter = \"dc.1\"\n").unwrap_err();
    assert!(err.to_string().contains("must not contain '.'"));
}

#[test]
fn clashing_grpc_ports_are_rejected() {
    let file = create_full_config("dc1", 8502, "info");
    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("must differ"));
}

#[test]
fn negative_tls_port_disables_tls() {
    let config =
        Config::from_toml("[server]\ndatacenter = \"dc1\"\ngrpc_tls_port = -1\n").unwrap();
    assert_eq!(config.server.grpc_tls_port, -1);
}

#[test]
fn zero_id_attempts_is_rejected() {
    let err = Config::from_toml(
        "[server]\ndatacenter = \"dc1\"\n[peering]\nid_generation_attempts = 0\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("id_generation_attempts"));
}

#[test]
fn invalid_log_level_is_rejected() {
    let file = create_full_config("dc1", 8503, "verbose");
    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("telemetry.log_level"));
}

#[test]
fn overrides_apply() {
    let file = create_minimal_config();
    let mut config = Config::from_file(file.path()).unwrap();
    config.apply_overrides(&ConfigOverrides {
        log_level: Some("warn".to_string()),
        datacenter: Some("west".to_string()),
        grpc_tls_port: Some(9503),
    });

    assert_eq!(config.telemetry.log_level, "warn");
    assert_eq!(config.server.datacenter, "west");
    assert_eq!(config.server.grpc_tls_port, 9503);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_overrides_change_nothing() {
    let file = create_full_config("east", 8503, "debug");
    let mut config = Config::from_file(file.path()).unwrap();
    config.apply_overrides(&ConfigOverrides::default());
    assert_eq!(config.server.datacenter, "east");
    assert_eq!(config.telemetry.log_level, "debug");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn error_classification() {
    assert!(PeeringError::CaUninitialized.is_retriable());
    assert!(PeeringError::consensus_write("PeeringWrite", "timed out".into()).is_retriable());
    assert!(PeeringError::state_store("failed to fetch roots", "io".into()).is_retriable());

    assert!(!PeeringError::configuration("off").is_retriable());
    assert!(!PeeringError::address_resolution("none").is_retriable());
    assert!(PeeringError::validation("bad id").is_invalid_input());
    assert!(PeeringError::structure("bad json").is_invalid_input());
    assert!(!PeeringError::SubscriptionClosed.is_invalid_input());
}

#[test]
fn error_messages_carry_context() {
    assert_eq!(
        PeeringError::state_store("failed to fetch roots", "disk gone".into()).to_string(),
        "failed to fetch roots: disk gone"
    );
    assert_eq!(
        PeeringError::CaUninitialized.to_string(),
        "CA has not finished initializing"
    );
    assert_eq!(
        PeeringError::Acl {
            source: "token expired".into()
        }
        .to_string(),
        "failed to resolve ACL token: token expired"
    );
}

#[test]
fn consensus_error_exposes_source() {
    use std::error::Error;
    let err = PeeringError::consensus_write("PeeringWrite", "not leader".into());
    assert_eq!(err.source().unwrap().to_string(), "not leader");
}
