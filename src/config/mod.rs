// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{ProxyError, Result};
use config::{Config, Environment, File};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file (`path`, or `~/.k8cache/config.toml` when absent)
    /// 3. Defaults (lowest)
    ///
    /// An explicitly given file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Self::default_config_path()).required(false),
        };

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            // Override with environment variables, e.g. K8CACHE_SERVER__PORT
            .add_source(
                Environment::with_prefix("K8CACHE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ProxyError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| ProxyError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the router could not serve.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for cluster in &self.clusters {
            // The identifier `<source>+<name>` is split on `+`; either part
            // containing one would alias another cluster's cache key.
            if cluster.name.is_empty() || cluster.name.contains(['/', '+']) {
                return Err(ProxyError::Config(format!(
                    "invalid cluster name {:?}",
                    cluster.name
                )));
            }
            if cluster.source.contains('+') {
                return Err(ProxyError::Config(format!(
                    "invalid source {:?} for cluster {:?}",
                    cluster.source, cluster.name
                )));
            }
            if !names.insert(cluster.name.as_str()) {
                return Err(ProxyError::Config(format!(
                    "duplicate cluster name {:?}",
                    cluster.name
                )));
            }
        }

        if self.cache.ttl_seconds == 0 {
            return Err(ProxyError::Config(
                "cache.ttl_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".k8cache")
            .join("config.toml")
    }
}
