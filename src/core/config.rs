//! Configuration parsing and validation.
//!
//! Configuration is loaded from TOML files with CLI overrides. The `[server]`
//! section carries the identity and transport settings the peering backend
//! checks before issuing tokens.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::net::tls::TlsConfigurator;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identity and gRPC transport settings.
    pub server: ServerConfig,

    /// TLS configurator settings.
    #[serde(default)]
    pub tls: TlsSettings,

    /// Peering behavior.
    #[serde(default)]
    pub peering: PeeringConfig,

    /// Telemetry and logging configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Server identity and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Datacenter this server belongs to.
    pub datacenter: String,

    /// Whether the service mesh (connect) CA is enabled.
    #[serde(default)]
    pub connect_enabled: bool,

    /// Plaintext gRPC port (0 disables).
    #[serde(default)]
    pub grpc_port: i32,

    /// TLS gRPC port (<= 0 disables).
    #[serde(default)]
    pub grpc_tls_port: i32,
}

impl ServerConfig {
    /// Create a server config for a datacenter with everything else disabled.
    pub fn new(datacenter: impl Into<String>) -> Self {
        Self {
            datacenter: datacenter.into(),
            connect_enabled: false,
            grpc_port: 0,
            grpc_tls_port: 0,
        }
    }

    /// Enable connect.
    pub fn with_connect(mut self, enabled: bool) -> Self {
        self.connect_enabled = enabled;
        self
    }

    /// Set the TLS gRPC port.
    pub fn with_grpc_tls_port(mut self, port: i32) -> Self {
        self.grpc_tls_port = port;
        self
    }
}

/// TLS configurator settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsSettings {
    /// Serve gRPC over TLS on the main gRPC port.
    #[serde(default)]
    pub grpc_use_tls: bool,
}

/// Peering behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeeringConfig {
    /// Built-in catalog service every server registers under.
    #[serde(default = "default_server_service_name")]
    pub server_service_name: String,

    /// Attempts when generating a unique peering id or secret.
    #[serde(default = "default_id_generation_attempts")]
    pub id_generation_attempts: u32,
}

impl Default for PeeringConfig {
    fn default() -> Self {
        Self {
            server_service_name: default_server_service_name(),
            id_generation_attempts: default_id_generation_attempts(),
        }
    }
}

/// Telemetry and logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// Default value functions

fn default_server_service_name() -> String {
    "consul".to_string()
}

fn default_id_generation_attempts() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Build a config around a server section, defaulting the rest.
    pub fn new(server: ServerConfig) -> Self {
        Self {
            server,
            tls: TlsSettings::default(),
            peering: PeeringConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).with_context(|| "failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides to the configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref log_level) = overrides.log_level {
            self.telemetry.log_level = log_level.clone();
        }
        if let Some(ref datacenter) = overrides.datacenter {
            self.server.datacenter = datacenter.clone();
        }
        if let Some(port) = overrides.grpc_tls_port {
            self.server.grpc_tls_port = port;
        }
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<()> {
        self.validate_server()?;
        self.validate_peering()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<()> {
        if self.server.datacenter.trim().is_empty() {
            anyhow::bail!("server.datacenter must not be empty");
        }
        if self.server.datacenter.contains('.') {
            anyhow::bail!(
                "server.datacenter must not contain '.', got: {}",
                self.server.datacenter
            );
        }
        if self.server.grpc_port < 0 {
            anyhow::bail!("server.grpc_port must be >= 0");
        }
        if self.server.grpc_port > 0 && self.server.grpc_port == self.server.grpc_tls_port {
            anyhow::bail!(
                "server.grpc_port and server.grpc_tls_port must differ, both are {}",
                self.server.grpc_port
            );
        }
        Ok(())
    }

    fn validate_peering(&self) -> Result<()> {
        if self.peering.server_service_name.is_empty() {
            anyhow::bail!("peering.server_service_name must not be empty");
        }
        if self.peering.id_generation_attempts == 0 {
            anyhow::bail!("peering.id_generation_attempts must be > 0");
        }
        Ok(())
    }

    fn validate_telemetry(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "telemetry.log_level must be one of {:?}, got: {}",
                valid_levels,
                self.telemetry.log_level
            );
        }
        Ok(())
    }
}

/// A loaded config doubles as a static TLS configurator.
impl TlsConfigurator for Config {
    fn grpc_server_use_tls(&self) -> bool {
        self.tls.grpc_use_tls
    }
}

/// CLI override options that can be applied to configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override log level.
    pub log_level: Option<String>,
    /// Override datacenter.
    pub datacenter: Option<String>,
    /// Override TLS gRPC port.
    pub grpc_tls_port: Option<i32>,
}
