// k8cache - Identity-scoped client cache for multi-cluster Kubernetes proxying
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use k8cache::cache::{CacheConfig, ClientCache};
use k8cache::cli::Args;
use k8cache::config::AppConfig;
use k8cache::kube::KubeClient;
use k8cache::server::create_router;
use k8cache::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let config = AppConfig::load(args.config.as_deref())?;

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting k8cache v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build the runtime with the configured worker count
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(run(config))
}

async fn run(config: AppConfig) -> Result<()> {
    // Phase 4: Client cache shared by every request
    let cache_config = CacheConfig::from(&config.cache);
    info!(
        "Client cache ttl={}s expiry={:?}",
        cache_config.ttl.as_secs(),
        cache_config.expiry
    );
    let clients: Arc<ClientCache<KubeClient>> = Arc::new(ClientCache::new(cache_config));

    // Phase 5: Build and start HTTP server
    let app = create_router(config.clone(), Arc::clone(&clients))?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let released = clients.drain();
    info!("Server shut down gracefully, released {} clients", released);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
