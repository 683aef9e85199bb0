//! In-process metrics for the peering backend.
//!
//! Metrics namespaces:
//! - peering.consensus.*
//! - peering.resolver.*
//! - peering.leader.*

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metric names.
pub mod metrics {
    /// Log entries submitted, per operation (`{op}` is the operation name).
    pub const CONSENSUS_APPLY_TOTAL: &str = "peering.consensus.{op}.apply_total";
    /// Log submissions that failed, per operation.
    pub const CONSENSUS_APPLY_ERRORS_TOTAL: &str = "peering.consensus.{op}.errors_total";
    /// Time spent waiting for an entry to commit, per operation.
    pub const CONSENSUS_APPLY_LATENCY: &str = "peering.consensus.{op}.apply_latency_us";
    /// Server instances dropped because they advertise no usable gRPC port.
    pub const RESOLVER_SKIPPED_SERVERS: &str = "peering.resolver.skipped_servers";
    /// Mesh gateway instances dropped because they are critical.
    pub const RESOLVER_UNHEALTHY_GATEWAYS: &str = "peering.resolver.unhealthy_gateways";
    /// Leader hint updates.
    pub const LEADER_ADDRESS_UPDATES: &str = "peering.leader.address_updates";

    /// Expand a per-operation metric name.
    pub fn for_operation(template: &str, operation: &str) -> String {
        template.replace("{op}", operation)
    }
}

/// Metrics registry.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Counter metrics.
    counters: RwLock<HashMap<String, AtomicU64>>,
    /// Histogram observations (count and sum only).
    histograms: RwLock<HashMap<String, HistogramData>>,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a counter.
    pub fn counter_inc(&self, name: &str) {
        self.counter_add(name, 1);
    }

    /// Add to a counter.
    pub fn counter_add(&self, name: &str, value: u64) {
        let counters = self.counters.read();
        if let Some(counter) = counters.get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
            return;
        }
        drop(counters);

        self.counters
            .write()
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(value, Ordering::Relaxed);
    }

    /// Get counter value.
    pub fn counter_get(&self, name: &str) -> u64 {
        self.counters
            .read()
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Record a duration observation in microseconds.
    pub fn observe_duration(&self, name: &str, elapsed: Duration) {
        let micros = elapsed.as_micros().min(u64::MAX as u128) as u64;
        let mut histograms = self.histograms.write();
        let data = histograms.entry(name.to_string()).or_default();
        data.count += 1;
        data.sum = data.sum.saturating_add(micros);
        data.max = data.max.max(micros);
    }

    /// Get histogram data.
    pub fn histogram_get(&self, name: &str) -> Option<HistogramData> {
        self.histograms.read().get(name).cloned()
    }

    /// Snapshot all counters, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut out: Vec<(String, u64)> = self
            .counters
            .read()
            .iter()
            .map(|(name, value)| (name.clone(), value.load(Ordering::Relaxed)))
            .collect();
        out.sort();
        out
    }
}

/// Histogram summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramData {
    pub count: u64,
    pub sum: u64,
    pub max: u64,
}

impl HistogramData {
    /// Mean of all observations, or zero when empty.
    pub fn mean(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.sum / self.count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let registry = MetricsRegistry::new();
        registry.counter_inc("a");
        registry.counter_add("a", 4);
        assert_eq!(registry.counter_get("a"), 5);
        assert_eq!(registry.counter_get("missing"), 0);
    }

    #[test]
    fn histogram_tracks_count_sum_max() {
        let registry = MetricsRegistry::new();
        registry.observe_duration("lat", Duration::from_micros(10));
        registry.observe_duration("lat", Duration::from_micros(30));
        let data = registry.histogram_get("lat").unwrap();
        assert_eq!(data.count, 2);
        assert_eq!(data.sum, 40);
        assert_eq!(data.max, 30);
        assert_eq!(data.mean(), 20);
    }

    #[test]
    fn operation_names_expand() {
        assert_eq!(
            metrics::for_operation(metrics::CONSENSUS_APPLY_TOTAL, "PeeringWrite"),
            "peering.consensus.PeeringWrite.apply_total"
        );
    }
}
