// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_with_registry,
    register_histogram_vec_with_registry, CounterVec, Encoder, Gauge, HistogramVec, Opts,
    Registry, TextEncoder,
};
use tracing::warn;

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // CLIENT CACHE METRICS
    // ============================================================================

    /// Client cache operations
    pub static ref CLIENT_CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("client_cache_operations_total", "Total client cache operations"),
        &["operation"], // operation: hit, miss, create, evict, failure
        REGISTRY
    ).unwrap();

    /// Current cached clients
    pub static ref CLIENT_CACHE_ENTRIES: Gauge = register_gauge_with_registry!(
        Opts::new("client_cache_entries", "Current number of cached clients"),
        REGISTRY
    ).unwrap();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Classified cluster requests
    pub static ref REQUESTS_CLASSIFIED: CounterVec = register_counter_vec_with_registry!(
        Opts::new("requests_classified_total", "Total cluster requests by classification"),
        &["verb", "kind_present"],
        REGISTRY
    ).unwrap();

    /// Upstream API server responses
    pub static ref UPSTREAM_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("upstream_requests_total", "Total requests forwarded to clusters"),
        &["cluster", "status_code"],
        REGISTRY
    ).unwrap();

    /// Time until upstream response headers arrive
    pub static ref UPSTREAM_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("upstream_duration_seconds", "Upstream time to response headers")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["cluster"],
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
