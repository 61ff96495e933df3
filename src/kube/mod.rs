//! Kubernetes cluster contexts and authenticated API clients.
//!
//! A [`KubeContext`] describes one configured cluster and implements
//! [`ClusterContext`](crate::cache::ClusterContext), so the client cache can
//! build a [`KubeClient`] bound to a caller's bearer token on demand.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod client;
mod context;

pub use client::KubeClient;
pub use context::KubeContext;
