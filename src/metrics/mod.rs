// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics, CLIENT_CACHE_ENTRIES, CLIENT_CACHE_OPERATIONS, REQUESTS_CLASSIFIED,
    UPSTREAM_DURATION, UPSTREAM_REQUESTS,
};

use crate::classify::Classification;

/// Helpers to record client cache operations
pub fn record_client_hit() {
    CLIENT_CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

pub fn record_client_miss() {
    CLIENT_CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

pub fn record_client_create() {
    CLIENT_CACHE_OPERATIONS.with_label_values(&["create"]).inc();
}

pub fn record_client_evict() {
    CLIENT_CACHE_OPERATIONS.with_label_values(&["evict"]).inc();
}

pub fn record_client_failure() {
    CLIENT_CACHE_OPERATIONS.with_label_values(&["failure"]).inc();
}

pub fn update_client_entries(count: usize) {
    CLIENT_CACHE_ENTRIES.set(count as f64);
}

/// Helper to record how a request was classified
pub fn record_classification(classification: &Classification) {
    let kind_present = if classification.has_kind() { "true" } else { "false" };
    REQUESTS_CLASSIFIED
        .with_label_values(&[classification.verb.as_str(), kind_present])
        .inc();
}

/// Helper to record a forwarded request
pub fn record_upstream(cluster: &str, status_code: u16, duration_secs: f64) {
    UPSTREAM_REQUESTS
        .with_label_values(&[cluster, &status_code.to_string()])
        .inc();

    UPSTREAM_DURATION
        .with_label_values(&[cluster])
        .observe(duration_secs);
}
