//! Structured logging and security-focused trace utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing utilities to keep
//! bearer credentials forwarded to clusters out of the logs.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{ProxyError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

lazy_static! {
    static ref BEARER: Regex = Regex::new(r"(?i)bearer\s+[A-Za-z0-9\-._~+/]+=*").unwrap();
    static ref JWT: Regex =
        Regex::new(r"eyJ[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]*").unwrap();
}

/// Initializes the global tracing subscriber for the application.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `compact`: Single-line output.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let initialized = match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    initialized.map_err(|e| ProxyError::Internal(format!("Failed to initialize logging: {}", e)))
}

/// Sanitizes bearer credentials from log messages.
///
/// Replaces `Bearer <token>` sequences and anything shaped like a JWT
/// (service account tokens, OIDC id tokens) with a redaction marker.
pub fn sanitize(input: &str) -> String {
    let result = BEARER.replace_all(input, "Bearer [REDACTED]");
    JWT.replace_all(&result, "[REDACTED_JWT]").into_owned()
}
