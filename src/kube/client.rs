// Authenticated Kubernetes API client
// Author: kelexine (https://github.com/kelexine)

use crate::error::KubeError;
use axum::http::{HeaderValue, Method};
use bytes::Bytes;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// HTTP client bound to one API server and one bearer token.
///
/// The token travels as a sensitive default header and never appears in
/// `Debug` output.
#[derive(Clone)]
pub struct KubeClient {
    http: Client,
    server: String,
}

impl KubeClient {
    pub fn new(
        server: &str,
        token: &str,
        connect_timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self, KubeError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        // No overall timeout: watch responses stay open indefinitely.
        let http = Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        debug!("Created Kubernetes client for {}", server);

        Ok(Self {
            http,
            server: server.trim_end_matches('/').to_string(),
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Absolute URL for an API path and optional raw query string
    pub fn url_for(&self, api_path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.server, api_path.trim_start_matches('/'));
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Send a request to the API server and return the raw response.
    ///
    /// The body is streamed by the caller, which keeps watch connections open.
    pub async fn forward(
        &self,
        method: Method,
        api_path: &str,
        query: Option<&str>,
        content_type: Option<&HeaderValue>,
        body: Bytes,
    ) -> Result<Response, reqwest::Error> {
        let url = self.url_for(api_path, query);
        debug!("Forwarding {} {}", method, url);

        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json, */*");

        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type.clone());
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        request.send().await
    }
}

impl fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeClient")
            .field("server", &self.server)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
