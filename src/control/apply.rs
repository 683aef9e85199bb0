//! Commit log submission for peering mutations.
//!
//! Every mutation is encoded as exactly one log entry and handed to the
//! consensus layer, which orders it against all other writes in the
//! cluster. The gateway blocks until the entry is applied or rejected and
//! never retries.

use crate::control::api::{
    DeregisterRequest, PeeringSecretsWriteRequest, PeeringTerminateByIdRequest,
    PeeringTrustBundleWriteRequest, PeeringWriteRequest, RegisterRequest,
};
use crate::core::error::{BoxError, PeeringError, PeeringResult};
use crate::ops::observability::{metrics, MetricsRegistry};
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Log entry kinds written by the peering backend.
///
/// The discriminant is the first byte of every encoded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Register = 0,
    Deregister = 1,
    PeeringWrite = 38,
    PeeringTerminateById = 40,
    PeeringTrustBundleWrite = 41,
    PeeringSecretsWrite = 43,
}

/// A single encoded commit log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: MessageType,
    /// Type byte followed by the JSON request body.
    pub data: Bytes,
}

impl LogEntry {
    /// Encode a request body behind its type byte.
    pub fn encode<T: Serialize>(kind: MessageType, body: &T) -> PeeringResult<Self> {
        let json = serde_json::to_vec(body).map_err(|e| {
            PeeringError::structure(format!("failed to encode {:?} entry: {}", kind, e))
        })?;
        let mut buf = BytesMut::with_capacity(json.len() + 1);
        buf.put_u8(kind as u8);
        buf.put_slice(&json);
        Ok(Self {
            kind,
            data: buf.freeze(),
        })
    }

    /// Request body without the type byte.
    pub fn body(&self) -> &[u8] {
        &self.data[1..]
    }
}

/// The cluster's ordered commit log.
pub trait LogWriter: Send + Sync {
    /// Submit an entry and wait until it is applied, returning its index.
    ///
    /// Fails with the consensus layer's own error (not leader, shutting
    /// down, apply error).
    fn apply(&self, entry: LogEntry) -> Result<u64, BoxError>;

    /// Whether this server currently leads the cluster.
    fn is_leader(&self) -> bool;
}

/// Funnels peering mutations into the commit log.
pub struct ConsensusWriteGateway {
    log: Arc<dyn LogWriter>,
    metrics: Arc<MetricsRegistry>,
}

impl ConsensusWriteGateway {
    /// Create a gateway over a log writer.
    pub fn new(log: Arc<dyn LogWriter>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { log, metrics }
    }

    /// Whether this server currently leads the cluster.
    pub fn is_leader(&self) -> bool {
        self.log.is_leader()
    }

    pub fn peering_secrets_write(&self, req: &PeeringSecretsWriteRequest) -> PeeringResult<()> {
        self.submit("PeeringSecretsWrite", MessageType::PeeringSecretsWrite, req)
    }

    pub fn peering_write(&self, req: &PeeringWriteRequest) -> PeeringResult<()> {
        self.submit("PeeringWrite", MessageType::PeeringWrite, req)
    }

    // Not triggered by an RPC, so this is the only place it gets metrics.
    pub fn peering_terminate_by_id(&self, req: &PeeringTerminateByIdRequest) -> PeeringResult<()> {
        self.submit(
            "PeeringTerminateByID",
            MessageType::PeeringTerminateById,
            req,
        )
    }

    pub fn peering_trust_bundle_write(
        &self,
        req: &PeeringTrustBundleWriteRequest,
    ) -> PeeringResult<()> {
        self.submit(
            "PeeringTrustBundleWrite",
            MessageType::PeeringTrustBundleWrite,
            req,
        )
    }

    pub fn catalog_register(&self, req: &RegisterRequest) -> PeeringResult<()> {
        self.submit("Catalog.Register", MessageType::Register, req)
    }

    pub fn catalog_deregister(&self, req: &DeregisterRequest) -> PeeringResult<()> {
        self.submit("Catalog.Deregister", MessageType::Deregister, req)
    }

    fn submit<T: Serialize>(
        &self,
        operation: &'static str,
        kind: MessageType,
        body: &T,
    ) -> PeeringResult<()> {
        let entry = LogEntry::encode(kind, body)?;
        let started = Instant::now();
        self.metrics
            .counter_inc(&metrics::for_operation(metrics::CONSENSUS_APPLY_TOTAL, operation));

        let result = self.log.apply(entry);
        self.metrics.observe_duration(
            &metrics::for_operation(metrics::CONSENSUS_APPLY_LATENCY, operation),
            started.elapsed(),
        );

        match result {
            Ok(index) => {
                tracing::debug!(operation, index, "applied peering log entry");
                Ok(())
            }
            Err(source) => {
                self.metrics.counter_inc(&metrics::for_operation(
                    metrics::CONSENSUS_APPLY_ERRORS_TOTAL,
                    operation,
                ));
                tracing::warn!(operation, error = %source, "peering log entry rejected");
                Err(PeeringError::consensus_write(operation, source))
            }
        }
    }
}
