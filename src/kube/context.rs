// Cluster context backed by static configuration
// Author: kelexine (https://github.com/kelexine)

use super::KubeClient;
use crate::cache::{BoxError, ClusterContext};
use crate::config::ClusterConfig;
use async_trait::async_trait;
use std::time::Duration;

/// A configured cluster able to mint per-token clients.
#[derive(Debug, Clone)]
pub struct KubeContext {
    name: String,
    cluster_id: String,
    server: String,
    connect_timeout: Duration,
    accept_invalid_certs: bool,
}

impl KubeContext {
    pub fn from_config(config: &ClusterConfig) -> Self {
        Self {
            name: config.name.clone(),
            cluster_id: format!("{}+{}", config.source, config.name),
            server: config.server.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_seconds),
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server(&self) -> &str {
        &self.server
    }
}

#[async_trait]
impl ClusterContext for KubeContext {
    type Client = KubeClient;

    fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    async fn client_with_token(&self, token: &str) -> Result<KubeClient, BoxError> {
        let client = KubeClient::new(
            &self.server,
            token,
            self.connect_timeout,
            self.accept_invalid_certs,
        )?;
        Ok(client)
    }
}
