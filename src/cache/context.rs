// Cluster context capability consumed by the client cache
// Author: kelexine (https://github.com/kelexine)

use async_trait::async_trait;

/// Boxed error returned by client construction.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A cluster the proxy can talk to.
///
/// Implementors expose a compound identifier of the form `<prefix>+<cluster>`
/// and know how to build a fresh API client authenticated with a bearer token.
#[async_trait]
pub trait ClusterContext: Send + Sync {
    /// The authenticated client handed out by the cache.
    type Client: Send + Sync + 'static;

    /// Compound cluster identifier, e.g. `kubeconfig+minikube`.
    fn cluster_id(&self) -> &str;

    /// Build a new client that authenticates with `token`.
    async fn client_with_token(&self, token: &str) -> Result<Self::Client, BoxError>;
}
