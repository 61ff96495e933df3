// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{cluster_handler, health_handler, metrics_handler};
use super::middleware::{request_id_layers, sensitive_headers_layer};
use crate::cache::ClientCache;
use crate::config::AppConfig;
use crate::error::Result;
use crate::kube::{KubeClient, KubeContext};
use axum::{routing::{any, get}, Router};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// Cluster contexts by short name
    pub clusters: Arc<HashMap<String, KubeContext>>,
    pub clients: Arc<ClientCache<KubeClient>>,
}

pub fn create_router(config: AppConfig, clients: Arc<ClientCache<KubeClient>>) -> Result<Router> {
    config.validate()?;

    let clusters: HashMap<String, KubeContext> = config
        .clusters
        .iter()
        .map(|cluster| (cluster.name.clone(), KubeContext::from_config(cluster)))
        .collect();

    for ctx in clusters.values() {
        info!("Serving cluster {} -> {}", ctx.name(), ctx.server());
    }

    let max_body_bytes = config.server.max_body_bytes;
    let state = AppState {
        config,
        clusters: Arc::new(clusters),
        clients,
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/clusters/:cluster/*api", any(cluster_handler))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(sensitive_headers_layer())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
