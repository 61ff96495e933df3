// Error types for k8cache
// Author: kelexine (https://github.com/kelexine)

use crate::cache::BoxError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failures of the identity-scoped client cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cluster identifier lacks the `<prefix>+<cluster>` structure.
    #[error("unexpected cluster identifier format: {cluster_id:?}")]
    MalformedIdentifier { cluster_id: String },

    /// The cluster context could not build a client. `key` is the token-safe
    /// fingerprint of the cache key.
    #[error("error while creating client for key {key}: {source}")]
    ClientConstructionFailed {
        key: String,
        #[source]
        source: BoxError,
    },
}

/// Failures while building an authenticated Kubernetes client.
#[derive(Error, Debug)]
pub enum KubeError {
    #[error("bearer token is not a valid header value")]
    InvalidToken(#[from] axum::http::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Builder(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Unknown cluster: {0}")]
    UnknownCluster(String),

    #[error("Missing bearer token")]
    MissingToken,

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convert ProxyError to HTTP responses for Axum
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ProxyError::MissingToken => (StatusCode::UNAUTHORIZED, "authentication_error"),
            ProxyError::UnknownCluster(_) => (StatusCode::NOT_FOUND, "unknown_cluster"),
            ProxyError::Config(_) | ProxyError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            ProxyError::Cache(CacheError::MalformedIdentifier { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "cluster_identifier_error")
            }
            ProxyError::Cache(CacheError::ClientConstructionFailed { .. }) => {
                (StatusCode::BAD_GATEWAY, "client_construction_error")
            }
            ProxyError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            ProxyError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
