// Client cache - identity-scoped reuse of authenticated cluster clients
// Author: kelexine (https://github.com/kelexine)

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::context::ClusterContext;
use crate::cache::models::{CacheConfig, CacheEntry, CacheStats, ExpiryPolicy};
use crate::error::CacheError;
use crate::metrics;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

type FlightMap = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

/// Cache of authenticated clients keyed by `(cluster, bearer token)`.
///
/// The entry table is guarded by a short synchronous lock that is never held
/// across an `.await`. Construction is single-flight per key: callers racing
/// on the same identity wait on a per-key async mutex and re-check the table
/// once they acquire it, so only one client is ever built per key at a time,
/// while lookups and constructions for other identities proceed untouched.
pub struct ClientCache<C> {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry<C>>>,
    /// Per-key construction locks, present only while a build is in flight
    inflight: FlightMap,
    stats: Mutex<CacheStats>,
}

impl<C: Send + Sync + 'static> ClientCache<C> {
    /// Create a new client cache driven by the wall clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new client cache with an explicit time source
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the cached client for `(ctx, token)`, building one on a miss.
    ///
    /// Hits hand back the same `Arc` that was stored. An entry older than the
    /// TTL is evicted and rebuilt. A failed build leaves the table untouched.
    pub async fn obtain_client<X>(&self, ctx: &X, token: &str) -> Result<Arc<C>, CacheError>
    where
        X: ClusterContext<Client = C> + ?Sized,
    {
        let cluster = cluster_name(ctx.cluster_id())?;
        let key = format!("{}-{}", cluster, token);
        let label = fingerprint(cluster, token);

        if let Some(client) = self.lookup(&key, &label) {
            return Ok(client);
        }

        let flight = Flight::join(&self.inflight, &key);
        let _guard = flight.lock.lock().await;

        // Another caller may have stored a client while we waited.
        if let Some(client) = self.lookup(&key, &label) {
            return Ok(client);
        }

        self.construct(ctx, token, &key, &label).await
    }

    /// Look up a live entry, evicting it if it has outlived the TTL.
    fn lookup(&self, key: &str, label: &str) -> Option<Arc<C>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(key)?;

        if self.is_expired(entry.last_used, now) {
            entries.remove(key);
            let remaining = entries.len();
            drop(entries);

            info!("Client {} was evicted after exceeding its TTL", label);
            self.stats.lock().evictions += 1;
            metrics::record_client_evict();
            metrics::update_client_entries(remaining);
            return None;
        }

        if self.config.expiry == ExpiryPolicy::Sliding {
            entry.last_used = now;
        }
        let client = Arc::clone(&entry.client);
        drop(entries);

        debug!("Client cache hit: {}", label);
        self.stats.lock().hits += 1;
        metrics::record_client_hit();
        Some(client)
    }

    async fn construct<X>(
        &self,
        ctx: &X,
        token: &str,
        key: &str,
        label: &str,
    ) -> Result<Arc<C>, CacheError>
    where
        X: ClusterContext<Client = C> + ?Sized,
    {
        debug!("Client cache miss: {}", label);
        self.stats.lock().misses += 1;
        metrics::record_client_miss();

        let client = match ctx.client_with_token(token).await {
            Ok(client) => Arc::new(client),
            Err(source) => {
                warn!("Failed to construct client for {}: {}", label, source);
                self.stats.lock().failures += 1;
                metrics::record_client_failure();
                return Err(CacheError::ClientConstructionFailed {
                    key: label.to_string(),
                    source,
                });
            }
        };

        let count = {
            let mut entries = self.entries.lock();
            entries.insert(
                key.to_string(),
                CacheEntry {
                    client: Arc::clone(&client),
                    last_used: self.clock.now(),
                },
            );
            entries.len()
        };

        debug!("Client created: {} ({} cached)", label, count);
        self.stats.lock().creates += 1;
        metrics::record_client_create();
        metrics::update_client_entries(count);
        Ok(client)
    }

    fn is_expired(&self, last_used: Instant, now: Instant) -> bool {
        now.saturating_duration_since(last_used) > self.config.ttl
    }

    /// Number of entries currently stored, expired or not
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    /// Release every cached client. Called on shutdown; the cache stays usable.
    pub fn drain(&self) -> usize {
        let drained = {
            let mut entries = self.entries.lock();
            let count = entries.len();
            entries.clear();
            count
        };

        info!("Drained {} cached clients", drained);
        metrics::update_client_entries(0);
        drained
    }
}

/// Membership in the construction queue for one cache key.
///
/// Dropping the last participant removes the key's lock from the map, including
/// when the owning future is cancelled mid-build.
struct Flight<'a> {
    inflight: &'a FlightMap,
    key: &'a str,
    lock: Arc<AsyncMutex<()>>,
}

impl<'a> Flight<'a> {
    fn join(inflight: &'a FlightMap, key: &'a str) -> Self {
        let lock = inflight
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        Self { inflight, key, lock }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock();
        let ours = inflight
            .get(self.key)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock));
        // One reference in the map plus ours: nobody else is queued.
        if ours && Arc::strong_count(&self.lock) == 2 {
            inflight.remove(self.key);
        }
    }
}

/// Extract the cluster name from a `<prefix>+<cluster>` identifier
pub fn cluster_name(cluster_id: &str) -> Result<&str, CacheError> {
    cluster_id
        .split('+')
        .nth(1)
        .ok_or_else(|| CacheError::MalformedIdentifier {
            cluster_id: cluster_id.to_string(),
        })
}

/// Render a cache key for logs without exposing the bearer token
pub fn fingerprint(cluster: &str, token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{}-{}", cluster, &hex::encode(digest)[..12])
}
