//! Axum-based HTTP server for the k8cache proxy.
//!
//! This is the request-handling layer that sits in front of the clusters: it
//! resolves the target cluster, pulls the caller's bearer token, labels the
//! request with the classifier, obtains a cached client and streams the
//! upstream response back.
//!
//! # Components
//!
//! - `handlers`: Cluster proxy, health and metrics endpoints.
//! - `middleware`: Request ID tracking and credential header masking.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::bearer_token;
pub use routes::{create_router, AppState};
