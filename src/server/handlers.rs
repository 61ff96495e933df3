// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::cache::ExpiryPolicy;
use crate::classify::classify;
use crate::error::ProxyError;
use crate::metrics;
use crate::utils::logging::sanitize;
use axum::{
    body::{Body, Bytes},
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Upstream response headers copied back to the caller
const PASSTHROUGH_HEADERS: [header::HeaderName; 4] = [
    header::CONTENT_TYPE,
    header::CACHE_CONTROL,
    header::ETAG,
    header::WARNING,
];

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    let cluster_check = if state.clusters.is_empty() {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "warning".to_string(),
            message: "No clusters configured".to_string(),
        }
    } else {
        HealthCheck {
            status: "ok".to_string(),
            message: format!("{} clusters configured", state.clusters.len()),
        }
    };
    checks.insert("clusters".to_string(), cluster_check);

    let server = &state.config.server;
    checks.insert(
        "server".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!(
                "Listening on {}:{} with {} workers, body limit {} bytes",
                server.host, server.port, server.workers, server.max_body_bytes
            ),
        },
    );

    let stats = state.clients.stats();
    let cache_config = state.clients.config();
    let expiry = match cache_config.expiry {
        ExpiryPolicy::Absolute => "absolute",
        ExpiryPolicy::Sliding => "sliding",
    };
    checks.insert(
        "client_cache".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: format!(
                "{} cached clients (ttl {}s, {} expiry); hits={} misses={} evictions={} failures={}",
                state.clients.len(),
                cache_config.ttl.as_secs(),
                expiry,
                stats.hits,
                stats.misses,
                stats.evictions,
                stats.failures
            ),
        },
    );

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

/// Handler for `/clusters/:cluster/*api`: forwards the request with a cached,
/// token-scoped client and streams the response back.
pub async fn cluster_handler(
    State(state): State<AppState>,
    Path((cluster, api)): Path<(String, String)>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let ctx = state
        .clusters
        .get(&cluster)
        .ok_or_else(|| ProxyError::UnknownCluster(cluster.clone()))?;
    let token = bearer_token(&headers).ok_or(ProxyError::MissingToken)?;

    let classification = classify(&method, Some(&api), query.as_deref());
    metrics::record_classification(&classification);
    debug!(
        cluster = %cluster,
        kind = %classification.kind,
        verb = %classification.verb,
        "Classified request"
    );

    let client = state.clients.obtain_client(ctx, token).await?;

    let started = Instant::now();
    let upstream = client
        .forward(
            method,
            &api,
            query.as_deref(),
            headers.get(header::CONTENT_TYPE),
            body,
        )
        .await
        .map_err(|e| {
            warn!(
                "Upstream request to cluster {} failed: {}",
                cluster,
                sanitize(&e.to_string())
            );
            ProxyError::Upstream(e)
        })?;

    let status = upstream.status();
    metrics::record_upstream(&cluster, status.as_u16(), started.elapsed().as_secs_f64());

    let mut response = Response::builder().status(status);
    for name in PASSTHROUGH_HEADERS {
        if let Some(value) = upstream.headers().get(&name) {
            response = response.header(name, value.clone());
        }
    }

    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| ProxyError::Internal(format!("Failed to build response: {}", e)))
}

/// Extract the bearer credential from an `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
