// Client cache behaviour through the public API
// Author: kelexine (https://github.com/kelexine)

use async_trait::async_trait;
use k8cache::cache::{
    BoxError, CacheConfig, ClientCache, ClusterContext, ExpiryPolicy, ManualClock, DEFAULT_TTL,
};
use k8cache::error::CacheError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_test::{assert_err, assert_ok};

#[derive(Debug)]
struct FakeClient {
    serial: usize,
    token: String,
}

struct FakeContext {
    cluster_id: String,
    builds: AtomicUsize,
    fail: bool,
    delay: Duration,
}

impl FakeContext {
    fn new(cluster_id: &str) -> Self {
        Self {
            cluster_id: cluster_id.to_string(),
            builds: AtomicUsize::new(0),
            fail: false,
            delay: Duration::ZERO,
        }
    }

    fn failing(cluster_id: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(cluster_id)
        }
    }

    fn slow(cluster_id: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(cluster_id)
        }
    }

    fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterContext for FakeContext {
    type Client = FakeClient;

    fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    async fn client_with_token(&self, token: &str) -> Result<FakeClient, BoxError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let serial = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err("identity provider unavailable".into());
        }
        Ok(FakeClient {
            serial,
            token: token.to_string(),
        })
    }
}

fn cache_with_clock(expiry: ExpiryPolicy) -> (ClientCache<FakeClient>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let config = CacheConfig {
        ttl: DEFAULT_TTL,
        expiry,
    };
    let cache = ClientCache::with_clock(config, clock.clone());
    (cache, clock)
}

#[tokio::test]
async fn test_hit_returns_identical_client() {
    let (cache, _clock) = cache_with_clock(ExpiryPolicy::Absolute);
    let ctx = FakeContext::new("kubeconfig+minikube");

    let first = assert_ok!(cache.obtain_client(&ctx, "token-a").await);
    let second = assert_ok!(cache.obtain_client(&ctx, "token-a").await);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.token, "token-a");
    assert_eq!(ctx.builds(), 1);
    assert_eq!(cache.len(), 1);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.creates, 1);
}

#[tokio::test]
async fn test_identity_scoped_by_cluster_and_token() {
    let (cache, _clock) = cache_with_clock(ExpiryPolicy::Absolute);
    let alpha = FakeContext::new("kubeconfig+alpha");
    let beta = FakeContext::new("kubeconfig+beta");

    let a1 = assert_ok!(cache.obtain_client(&alpha, "token-1").await);
    let a2 = assert_ok!(cache.obtain_client(&alpha, "token-2").await);
    let b1 = assert_ok!(cache.obtain_client(&beta, "token-1").await);

    assert!(!Arc::ptr_eq(&a1, &a2));
    assert!(!Arc::ptr_eq(&a1, &b1));
    assert_eq!(cache.len(), 3);
}

#[tokio::test]
async fn test_identifier_prefix_is_not_part_of_the_key() {
    let (cache, _clock) = cache_with_clock(ExpiryPolicy::Absolute);
    let from_file = FakeContext::new("kubeconfig+prod");
    let dynamic = FakeContext::new("dynamic+prod");

    let first = assert_ok!(cache.obtain_client(&from_file, "token").await);
    let second = assert_ok!(cache.obtain_client(&dynamic, "token").await);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(dynamic.builds(), 0);
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let (cache, clock) = cache_with_clock(ExpiryPolicy::Absolute);
    let ctx = FakeContext::new("kubeconfig+minikube");

    let original = assert_ok!(cache.obtain_client(&ctx, "token").await);

    // Exactly at the TTL the entry is still live.
    clock.advance(DEFAULT_TTL);
    let same = assert_ok!(cache.obtain_client(&ctx, "token").await);
    assert!(Arc::ptr_eq(&original, &same));

    clock.advance(Duration::from_secs(1));
    let fresh = assert_ok!(cache.obtain_client(&ctx, "token").await);

    assert!(!Arc::ptr_eq(&original, &fresh));
    assert_eq!(fresh.serial, 2);
    assert_eq!(ctx.builds(), 2);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().evictions, 1);
}

// Hits do not extend an entry under the default policy: an actively used
// client still expires a fixed TTL after it was created.
#[tokio::test]
async fn test_absolute_expiry_ignores_hits() {
    let (cache, clock) = cache_with_clock(ExpiryPolicy::Absolute);
    let ctx = FakeContext::new("kubeconfig+minikube");

    let original = assert_ok!(cache.obtain_client(&ctx, "token").await);
    clock.advance(Duration::from_secs(9 * 60));
    assert_ok!(cache.obtain_client(&ctx, "token").await);
    clock.advance(Duration::from_secs(2 * 60));

    let after = assert_ok!(cache.obtain_client(&ctx, "token").await);
    assert!(!Arc::ptr_eq(&original, &after));
    assert_eq!(ctx.builds(), 2);
}

#[tokio::test]
async fn test_sliding_expiry_extends_on_hit() {
    let (cache, clock) = cache_with_clock(ExpiryPolicy::Sliding);
    let ctx = FakeContext::new("kubeconfig+minikube");

    let original = assert_ok!(cache.obtain_client(&ctx, "token").await);
    clock.advance(Duration::from_secs(9 * 60));
    assert_ok!(cache.obtain_client(&ctx, "token").await);
    clock.advance(Duration::from_secs(2 * 60));

    let after = assert_ok!(cache.obtain_client(&ctx, "token").await);
    assert!(Arc::ptr_eq(&original, &after));
    assert_eq!(ctx.builds(), 1);

    clock.advance(DEFAULT_TTL + Duration::from_secs(1));
    let expired = assert_ok!(cache.obtain_client(&ctx, "token").await);
    assert!(!Arc::ptr_eq(&original, &expired));
}

#[tokio::test]
async fn test_malformed_identifier() {
    let (cache, _clock) = cache_with_clock(ExpiryPolicy::Absolute);
    let ctx = FakeContext::new("bare-id");

    let err = assert_err!(cache.obtain_client(&ctx, "token").await);
    match err {
        CacheError::MalformedIdentifier { cluster_id } => assert_eq!(cluster_id, "bare-id"),
        other => panic!("unexpected error: {other}"),
    }

    assert!(cache.is_empty());
    assert_eq!(ctx.builds(), 0);
    assert_eq!(cache.stats().misses, 0);
}

#[tokio::test]
async fn test_construction_failure_leaves_table_unchanged() {
    let (cache, _clock) = cache_with_clock(ExpiryPolicy::Absolute);
    let healthy = FakeContext::new("kubeconfig+healthy");
    let broken = FakeContext::failing("kubeconfig+broken");

    let kept = assert_ok!(cache.obtain_client(&healthy, "token").await);

    let err = assert_err!(cache.obtain_client(&broken, "super-secret-token").await);
    let message = err.to_string();
    assert!(matches!(err, CacheError::ClientConstructionFailed { .. }));
    assert!(message.contains("broken-"));
    assert!(message.contains("identity provider unavailable"));
    assert!(!message.contains("super-secret-token"));

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().failures, 1);

    // No retry happens internally; the next call builds again.
    assert_err!(cache.obtain_client(&broken, "super-secret-token").await);
    assert_eq!(broken.builds(), 2);

    let still = assert_ok!(cache.obtain_client(&healthy, "token").await);
    assert!(Arc::ptr_eq(&kept, &still));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_construction() {
    let cache: Arc<ClientCache<FakeClient>> = Arc::new(ClientCache::new(CacheConfig::default()));
    let ctx = Arc::new(FakeContext::slow("kubeconfig+minikube", Duration::from_millis(50)));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { cache.obtain_client(&*ctx, "token").await })
        })
        .collect();

    let mut clients = Vec::new();
    for handle in handles {
        clients.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(ctx.builds(), 1);
    assert!(clients.iter().all(|c| Arc::ptr_eq(c, &clients[0])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_after_expiry_rebuild_once() {
    let clock = Arc::new(ManualClock::new());
    let cache: Arc<ClientCache<FakeClient>> =
        Arc::new(ClientCache::with_clock(CacheConfig::default(), clock.clone()));
    let ctx = Arc::new(FakeContext::slow("kubeconfig+minikube", Duration::from_millis(50)));

    let stale = cache.obtain_client(&*ctx, "token").await.unwrap();
    clock.advance(DEFAULT_TTL + Duration::from_secs(1));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { cache.obtain_client(&*ctx, "token").await })
        })
        .collect();

    let mut clients = Vec::new();
    for handle in handles {
        clients.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(ctx.builds(), 2);
    assert!(clients.iter().all(|c| Arc::ptr_eq(c, &clients[0])));
    assert!(!Arc::ptr_eq(&stale, &clients[0]));
    assert_eq!(cache.stats().evictions, 1);
}

struct GatedContext {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl ClusterContext for GatedContext {
    type Client = FakeClient;

    fn cluster_id(&self) -> &str {
        "kubeconfig+gated"
    }

    async fn client_with_token(&self, token: &str) -> Result<FakeClient, BoxError> {
        if token == "slow" {
            self.started.notify_one();
            self.release.notified().await;
        }
        Ok(FakeClient {
            serial: 0,
            token: token.to_string(),
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_construction_does_not_block_other_identities() {
    let cache: Arc<ClientCache<FakeClient>> = Arc::new(ClientCache::new(CacheConfig::default()));
    let ctx = Arc::new(GatedContext {
        started: Notify::new(),
        release: Notify::new(),
    });

    let slow = {
        let cache = Arc::clone(&cache);
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move { cache.obtain_client(&*ctx, "slow").await.map(|c| c.serial) })
    };
    ctx.started.notified().await;

    let fast = tokio::time::timeout(Duration::from_secs(1), cache.obtain_client(&*ctx, "fast"))
        .await
        .expect("unrelated identity was blocked by an in-flight construction");
    assert_eq!(fast.unwrap().token, "fast");

    ctx.release.notify_one();
    assert_eq!(slow.await.unwrap().unwrap(), 0);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_cancelled_construction_does_not_wedge_key() {
    let cache: ClientCache<FakeClient> = ClientCache::new(CacheConfig::default());
    let ctx = FakeContext::slow("kubeconfig+minikube", Duration::from_millis(200));

    let cancelled =
        tokio::time::timeout(Duration::from_millis(10), cache.obtain_client(&ctx, "token")).await;
    assert!(cancelled.is_err());
    assert!(cache.is_empty());

    let client = assert_ok!(cache.obtain_client(&ctx, "token").await);
    assert_eq!(client.token, "token");
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_drain_releases_everything() {
    let (cache, _clock) = cache_with_clock(ExpiryPolicy::Absolute);
    let ctx = FakeContext::new("kubeconfig+minikube");

    let before = assert_ok!(cache.obtain_client(&ctx, "token-1").await);
    assert_ok!(cache.obtain_client(&ctx, "token-2").await);

    assert_eq!(cache.drain(), 2);
    assert!(cache.is_empty());

    let after = assert_ok!(cache.obtain_client(&ctx, "token-1").await);
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(ctx.builds(), 3);
}

#[test]
fn test_cache_config_defaults() {
    let config = CacheConfig::default();
    assert_eq!(config.ttl, Duration::from_secs(600));
    assert_eq!(config.expiry, ExpiryPolicy::Absolute);
}
