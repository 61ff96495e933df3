// k8cache - Identity-scoped client cache for multi-cluster Kubernetes proxying
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod kube;
pub mod metrics;
pub mod server;
pub mod utils;
