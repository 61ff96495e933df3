//! Configuration data structures for the k8cache proxy.
//!
//! This module defines the schema for the application settings, including
//! server parameters, logging, client cache tuning and the set of clusters
//! requests can be routed to.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::cache::ExpiryPolicy;
use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Authenticated client cache settings.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Clusters reachable through `/clusters/{name}/...`.
    #[serde(default)]
    pub clusters: Vec<ClusterConfig>,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `4466`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of Tokio worker threads.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Largest request body forwarded to a cluster, in bytes.
    /// Default: `10485760` (10 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Settings for the identity-scoped client cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Lifetime of a cached client in seconds.
    /// Default: `600` (10 minutes)
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// `absolute` expires entries a fixed time after creation,
    /// `sliding` extends them on every hit.
    /// Default: `absolute`
    #[serde(default)]
    pub expiry: ExpiryPolicy,
}

/// A Kubernetes cluster the proxy forwards to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Short cluster name, used in the route and the cache key.
    pub name: String,

    /// Where the cluster definition came from; forms the identifier
    /// `<source>+<name>`.
    /// Default: `config`
    #[serde(default = "default_source")]
    pub source: String,

    /// API server base URL, e.g. `https://10.0.0.1:6443`.
    pub server: String,

    /// Connection timeout towards the API server, in seconds.
    /// Default: `10`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Skip TLS certificate verification (development clusters only).
    /// Default: `false`
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            expiry: ExpiryPolicy::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4466
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_ttl_seconds() -> u64 {
    600
}

fn default_source() -> String {
    "config".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}
