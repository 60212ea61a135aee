use std::{ops::Deref, sync::Arc, time::Duration};

use prometheus_client::{
    metrics::{
        counter::Counter,
        gauge::Gauge,
        histogram::{Histogram, exponential_buckets},
    },
    registry::Registry,
};

#[derive(Clone, Debug)]
pub struct DasMetrics(Arc<Inner>);

impl Deref for DasMetrics {
    type Target = Inner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug)]
pub struct Inner {
    // Encoding
    sidecars_built: Counter,
    blobs_per_block: Gauge,

    // Verification
    verifications_success: Counter,
    verifications_failure: Counter,
    inclusion_proof_failures: Counter,
    verification_time: Histogram,

    // Reconstruction
    reconstruction_attempts: Counter,
    reconstruction_failures: Counter,
    reconstruction_time: Histogram,

    // Peer info cache
    peer_info_cache_hits: Counter,
    peer_info_cache_misses: Counter,
}

impl Inner {
    pub fn new() -> Self {
        Self {
            sidecars_built: Counter::default(),
            blobs_per_block: Gauge::default(),

            verifications_success: Counter::default(),
            verifications_failure: Counter::default(),
            inclusion_proof_failures: Counter::default(),
            verification_time: Histogram::new(exponential_buckets(0.001, 2.0, 10)),

            reconstruction_attempts: Counter::default(),
            reconstruction_failures: Counter::default(),
            reconstruction_time: Histogram::new(exponential_buckets(0.01, 2.0, 10)),

            peer_info_cache_hits: Counter::default(),
            peer_info_cache_misses: Counter::default(),
        }
    }
}

impl Default for Inner {
    fn default() -> Self {
        Self::new()
    }
}

impl DasMetrics {
    pub fn new() -> Self {
        Self(Arc::new(Inner::new()))
    }

    /// Capture a snapshot of the current counter and gauge values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sidecars_built: self.sidecars_built.get(),
            blobs_per_block: self.blobs_per_block.get(),
            verifications_success: self.verifications_success.get(),
            verifications_failure: self.verifications_failure.get(),
            inclusion_proof_failures: self.inclusion_proof_failures.get(),
            reconstruction_attempts: self.reconstruction_attempts.get(),
            reconstruction_failures: self.reconstruction_failures.get(),
            peer_info_cache_hits: self.peer_info_cache_hits.get(),
            peer_info_cache_misses: self.peer_info_cache_misses.get(),
        }
    }

    pub fn register(registry: &mut Registry) -> Self {
        let metrics = Self::new();
        let registry = registry.sub_registry_with_prefix("peerdas");

        registry.register(
            "sidecars_built",
            "Data column sidecars built from local blobs",
            metrics.sidecars_built.clone(),
        );

        registry.register(
            "blobs_per_block",
            "Number of blobs in the last encoded block",
            metrics.blobs_per_block.clone(),
        );

        registry.register(
            "verifications_success",
            "Data column sidecars that passed verification",
            metrics.verifications_success.clone(),
        );

        registry.register(
            "verifications_failure",
            "Data column sidecars rejected by verification",
            metrics.verifications_failure.clone(),
        );

        registry.register(
            "inclusion_proof_failures",
            "Sidecars whose commitments did not open the block body root",
            metrics.inclusion_proof_failures.clone(),
        );

        registry.register(
            "verification_time",
            "Time taken to verify a batch of data column sidecars (seconds)",
            metrics.verification_time.clone(),
        );

        registry.register(
            "reconstruction_attempts",
            "Column reconstructions started",
            metrics.reconstruction_attempts.clone(),
        );

        registry.register(
            "reconstruction_failures",
            "Column reconstructions that failed",
            metrics.reconstruction_failures.clone(),
        );

        registry.register(
            "reconstruction_time",
            "Time taken to reconstruct all columns of a block (seconds)",
            metrics.reconstruction_time.clone(),
        );

        registry.register(
            "peer_info_cache_hits",
            "Peer custody lookups served from cache",
            metrics.peer_info_cache_hits.clone(),
        );

        registry.register(
            "peer_info_cache_misses",
            "Peer custody lookups that had to be computed",
            metrics.peer_info_cache_misses.clone(),
        );

        metrics
    }

    /// Record sidecars built for one block
    pub fn record_sidecars_built(&self, sidecars: usize, blob_count: usize) {
        self.sidecars_built.inc_by(sidecars as u64);
        self.blobs_per_block.set(blob_count as i64);
    }

    pub fn record_verifications_success(&self, count: usize) {
        self.verifications_success.inc_by(count as u64);
    }

    pub fn record_verifications_failure(&self, count: usize) {
        self.verifications_failure.inc_by(count as u64);
    }

    pub fn record_inclusion_proof_failure(&self) {
        self.inclusion_proof_failures.inc();
    }

    pub fn observe_verification_time(&self, duration: Duration) {
        self.verification_time.observe(duration.as_secs_f64());
    }

    /// Record the outcome and duration of one reconstruction
    pub fn record_reconstruction(&self, duration: Duration, success: bool) {
        self.reconstruction_attempts.inc();
        if !success {
            self.reconstruction_failures.inc();
        }
        self.reconstruction_time.observe(duration.as_secs_f64());
    }

    pub fn record_peer_info_lookup(&self, cached: bool) {
        if cached {
            self.peer_info_cache_hits.inc();
        } else {
            self.peer_info_cache_misses.inc();
        }
    }
}

impl Default for DasMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of engine counters and gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Sidecars built from local blobs.
    pub sidecars_built: u64,
    /// Blob count of the last encoded block.
    pub blobs_per_block: i64,
    /// Sidecars accepted by verification.
    pub verifications_success: u64,
    /// Sidecars rejected by verification.
    pub verifications_failure: u64,
    /// Inclusion proof rejections.
    pub inclusion_proof_failures: u64,
    /// Reconstructions started.
    pub reconstruction_attempts: u64,
    /// Reconstructions failed.
    pub reconstruction_failures: u64,
    /// Peer info cache hits.
    pub peer_info_cache_hits: u64,
    /// Peer info cache misses.
    pub peer_info_cache_misses: u64,
}

#[cfg(test)]
mod tests {
    use prometheus_client::encoding::text::encode;

    use super::*;

    #[test]
    fn test_registered_metrics_are_exported() {
        let mut registry = Registry::default();
        let metrics = DasMetrics::register(&mut registry);
        metrics.record_sidecars_built(128, 3);
        metrics.record_reconstruction(Duration::from_millis(20), false);

        let mut out = String::new();
        encode(&mut out, &registry).unwrap();
        assert!(out.contains("peerdas_sidecars_built_total 128"));
        assert!(out.contains("peerdas_reconstruction_failures_total 1"));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.blobs_per_block, 3);
        assert_eq!(snapshot.reconstruction_attempts, 1);
    }
}
