//! Client cache configuration, entry and statistics models.

// Author: kelexine (https://github.com/kelexine)

use crate::config::CacheSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default lifetime of a cached client (10 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// How a cache hit affects the lifetime of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryPolicy {
    /// Entries expire a fixed TTL after creation; hits do not extend them.
    #[default]
    Absolute,
    /// Every hit resets the entry's timestamp.
    Sliding,
}

/// Configuration for the identity-scoped client cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum age of an entry before it is evicted on the next lookup.
    pub ttl: Duration,
    /// Whether hits refresh the entry timestamp.
    pub expiry: ExpiryPolicy,
}

impl Default for CacheConfig {
    /// Provides default values for the client cache.
    ///
    /// - `ttl`: 10 minutes
    /// - `expiry`: absolute
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            expiry: ExpiryPolicy::Absolute,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            ttl: Duration::from_secs(settings.ttl_seconds),
            expiry: settings.expiry,
        }
    }
}

/// A constructed client together with the instant it was stored.
#[derive(Debug)]
pub(crate) struct CacheEntry<C> {
    pub(crate) client: Arc<C>,
    pub(crate) last_used: Instant,
}

/// Counters for client cache operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the table.
    pub hits: u64,
    /// Lookups that had to construct a client.
    pub misses: u64,
    /// Clients successfully constructed and stored.
    pub creates: u64,
    /// Entries removed because they outlived the TTL.
    pub evictions: u64,
    /// Constructions that failed.
    pub failures: u64,
}
