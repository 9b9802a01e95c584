//! Read-through operation cache with mutation-driven invalidation.
//!
//! This module implements the core caching logic: serving named read
//! operations from the store within their TTL, populating on miss, and
//! purging dependent query groups after committed writes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fincache_core::ArgMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::op_key::OperationKey;
use crate::outcome::{CacheRead, StoreLookup};
use crate::policy::CachePolicy;
use crate::traits::CacheBackend;

/// Authoritative fetch function for named operations.
///
/// Implementations perform the real request against the backend API. The
/// error type is the implementation's own; the cache propagates it to the
/// caller unmodified. A fetch must be idempotent-safe to call twice, since
/// concurrent misses on the same key may each fetch independently.
#[async_trait]
pub trait BackendFetcher: Send + Sync {
    type Error: Send;

    /// Fetch the authoritative response for an operation.
    async fn fetch(&self, operation: &str, args: &ArgMap) -> Result<Value, Self::Error>;
}

/// Summary of an invalidation pass.
///
/// Store failures during invalidation degrade to temporarily stale reads;
/// they are counted here and logged, never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationOutcome {
    /// Number of read-operation groups targeted by the write.
    pub targets: usize,
    /// Number of cache entries removed.
    pub evicted: u64,
    /// Number of groups whose purge failed.
    pub failures: usize,
}

/// Stored representation of a cache entry.
///
/// The envelope carries its own timestamp so expiry is enforced on read
/// against the policy TTL even when the store's own TTL handling misbehaves.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    cached_at: DateTime<Utc>,
    payload: Value,
}

/// Read-through cache over named operations.
///
/// # Type Parameters
///
/// - `B`: The cache store backend
///
/// # Example
///
/// ```ignore
/// let cache = OperationCache::new(Arc::new(RedisBackend::new(url)?), CachePolicy::standard());
///
/// let read = cache.read_through(&user_id, "GetExpenses", &args, &fetcher).await?;
/// let payload = read.into_value();
///
/// // after the mutation committed:
/// cache.invalidate_after_write(&user_id, "CreateExpense").await;
/// ```
pub struct OperationCache<B: CacheBackend> {
    backend: Arc<B>,
    policy: CachePolicy,
}

impl<B: CacheBackend> OperationCache<B> {
    /// Create a new operation cache.
    pub fn new(backend: Arc<B>, policy: CachePolicy) -> Self {
        Self { backend, policy }
    }

    /// Get the cache policy.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Get a reference to the store backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serve a read operation, consulting the cache first.
    ///
    /// A live entry is returned without invoking the fetcher. On a miss (or
    /// when the operation has no TTL configured) the fetcher provides the
    /// authoritative response, which is stored with the operation's TTL only
    /// when one is configured. Fetcher failures propagate unmodified and
    /// never populate the cache; store failures fail open and are only
    /// visible through the returned read's degraded flag.
    pub async fn read_through<F>(
        &self,
        user_id: &str,
        operation: &str,
        args: &ArgMap,
        fetcher: &F,
    ) -> Result<CacheRead<Value>, F::Error>
    where
        F: BackendFetcher,
    {
        let ttl = self.policy.ttl_for(operation);
        let key = OperationKey::new(user_id, operation, args).render();
        let mut degraded = false;

        if let Some(ttl) = ttl {
            match self.lookup(&key).await {
                StoreLookup::Hit(bytes) => match serde_json::from_slice::<CacheEnvelope>(&bytes) {
                    Ok(envelope) if Self::is_live(&envelope, ttl) => {
                        debug!(operation, "cache hit");
                        return Ok(CacheRead::from_cache(envelope.payload, envelope.cached_at));
                    }
                    Ok(_) => {
                        // expired under the current policy; treat as a miss
                        debug!(operation, "cache entry expired");
                    }
                    Err(err) => {
                        warn!(operation, error = %err, "corrupt cache entry, refetching");
                        degraded = true;
                    }
                },
                StoreLookup::Miss => {
                    debug!(operation, "cache miss");
                }
                StoreLookup::Unavailable(err) => {
                    warn!(operation, error = %err, "cache lookup failed, falling through to backend");
                    degraded = true;
                }
            }
        }

        let payload = fetcher.fetch(operation, args).await?;

        if let Some(ttl) = ttl {
            let envelope = CacheEnvelope {
                cached_at: Utc::now(),
                payload,
            };
            match serde_json::to_vec(&envelope) {
                Ok(bytes) => {
                    if let Err(err) = self.backend.put(&key, &bytes, ttl).await {
                        warn!(operation, error = %err, "cache populate failed");
                        degraded = true;
                    }
                }
                Err(err) => {
                    warn!(operation, error = %err, "response not serializable, not cached");
                    degraded = true;
                }
            }
            return Ok(CacheRead::from_backend(envelope.payload).with_degraded(degraded));
        }

        Ok(CacheRead::from_backend(payload).with_degraded(degraded))
    }

    /// Purge every cached query a committed write can make stale.
    ///
    /// Must be called only after the write has been durably committed.
    /// Deletes all cached argument variants of every target operation for
    /// the acting user; other users' entries are never touched. A write
    /// absent from the invalidation table purges nothing.
    pub async fn invalidate_after_write(
        &self,
        user_id: &str,
        operation: &str,
    ) -> InvalidationOutcome {
        let targets = self.policy.invalidation_targets(operation);
        let mut outcome = InvalidationOutcome {
            targets: targets.len(),
            ..Default::default()
        };

        for target in targets {
            let prefix = OperationKey::group_prefix(user_id, target);
            match self.backend.purge_prefix(&prefix).await {
                Ok(count) => outcome.evicted += count,
                Err(err) => {
                    outcome.failures += 1;
                    warn!(
                        mutation = operation,
                        target,
                        error = %err,
                        "cache invalidation failed; reads stay stale until TTL"
                    );
                }
            }
        }

        if outcome.targets > 0 {
            debug!(
                mutation = operation,
                evicted = outcome.evicted,
                failures = outcome.failures,
                "invalidated dependent queries"
            );
        }
        outcome
    }

    async fn lookup(&self, key: &str) -> StoreLookup {
        match self.backend.get(key).await {
            Ok(Some(bytes)) => StoreLookup::Hit(bytes),
            Ok(None) => StoreLookup::Miss,
            Err(err) => StoreLookup::Unavailable(err),
        }
    }

    fn is_live(envelope: &CacheEnvelope, ttl: Duration) -> bool {
        let age = Utc::now()
            .signed_duration_since(envelope.cached_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age < ttl
    }
}

impl<B: CacheBackend> Clone for OperationCache<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            policy: self.policy.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_backend::MemoryBackend;
    use fincache_core::{StoreError, StoreResult};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    // Fetcher returning a fixed payload, counting invocations.
    struct MockFetcher {
        payload: Value,
        calls: AtomicUsize,
    }

    impl MockFetcher {
        fn new(payload: Value) -> Self {
            Self {
                payload,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BackendFetcher for MockFetcher {
        type Error = String;

        async fn fetch(&self, _operation: &str, _args: &ArgMap) -> Result<Value, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    // Fetcher that always fails.
    struct FailingFetcher {
        calls: AtomicUsize,
    }

    impl FailingFetcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BackendFetcher for FailingFetcher {
        type Error = String;

        async fn fetch(&self, _operation: &str, _args: &ArgMap) -> Result<Value, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err("backend unavailable".to_string())
        }
    }

    // Store that fails every operation.
    struct FailingBackend;

    fn conn_refused() -> StoreError {
        StoreError::Connection {
            reason: "connection refused".to_string(),
        }
    }

    #[async_trait]
    impl CacheBackend for FailingBackend {
        async fn get(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
            Err(conn_refused())
        }

        async fn put(&self, _key: &str, _value: &[u8], _ttl: Duration) -> StoreResult<()> {
            Err(conn_refused())
        }

        async fn delete(&self, _key: &str) -> StoreResult<u64> {
            Err(conn_refused())
        }

        async fn purge_prefix(&self, _prefix: &str) -> StoreResult<u64> {
            Err(conn_refused())
        }

        async fn stats(&self) -> StoreResult<crate::traits::CacheStats> {
            Err(conn_refused())
        }
    }

    fn user() -> String {
        Uuid::now_v7().to_string()
    }

    fn standard_cache() -> OperationCache<MemoryBackend> {
        OperationCache::new(Arc::new(MemoryBackend::new()), CachePolicy::standard())
    }

    fn year_args(year: i64) -> ArgMap {
        ArgMap::from([("year".to_string(), json!(year))])
    }

    #[tokio::test]
    async fn test_sequential_reads_fetch_once() {
        let cache = standard_cache();
        let fetcher = MockFetcher::new(json!({"expenses": []}));
        let user = user();

        let first = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(first.was_cache_miss());

        let second = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(second.was_cache_hit());
        assert_eq!(second.value(), &json!({"expenses": []}));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_args_cached_separately() {
        let cache = standard_cache();
        let fetcher = MockFetcher::new(json!([]));
        let user = user();

        for _ in 0..2 {
            cache
                .read_through(&user, "GetExpenses", &year_args(2023), &fetcher)
                .await
                .unwrap();
            cache
                .read_through(&user, "GetExpenses", &year_args(2024), &fetcher)
                .await
                .unwrap();
        }
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_operation_without_ttl_never_cached() {
        let cache = standard_cache();
        let fetcher = MockFetcher::new(json!({"token": "x"}));
        let user = user();

        for _ in 0..3 {
            let read = cache
                .read_through(&user, "GetSessionNonce", &ArgMap::new(), &fetcher)
                .await
                .unwrap();
            assert!(read.was_cache_miss());
        }
        assert_eq!(fetcher.calls(), 3);
        assert!(cache.backend().is_empty());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let policy = CachePolicy::empty()
            .with_ttl(fincache_core::QueryOp::GetExpenses, Duration::from_millis(100));
        let cache = OperationCache::new(Arc::new(MemoryBackend::new()), policy);
        let fetcher = MockFetcher::new(json!([]));
        let user = user();

        cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        let mid = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(mid.was_cache_hit());
        assert_eq!(fetcher.calls(), 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        let late = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(late.was_cache_miss());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = standard_cache();
        let user = user();

        let failing = FailingFetcher::new();
        let err = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &failing)
            .await
            .unwrap_err();
        assert_eq!(err, "backend unavailable");
        assert!(cache.backend().is_empty());

        // The next read must go to the backend again.
        let fetcher = MockFetcher::new(json!([]));
        let read = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(read.was_cache_miss());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidation_evicts_every_argument_variant() {
        let cache = standard_cache();
        let fetcher = MockFetcher::new(json!([]));
        let user = user();

        cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        cache
            .read_through(&user, "GetExpenses", &year_args(2024), &fetcher)
            .await
            .unwrap();
        cache
            .read_through(&user, "GetBalance", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        // GetMe is not a CreateExpense dependency and must survive.
        cache
            .read_through(&user, "GetMe", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert_eq!(fetcher.calls(), 4);

        let outcome = cache.invalidate_after_write(&user, "CreateExpense").await;
        assert_eq!(outcome.targets, 4);
        assert_eq!(outcome.evicted, 3);
        assert_eq!(outcome.failures, 0);

        for args in [ArgMap::new(), year_args(2024)] {
            let read = cache
                .read_through(&user, "GetExpenses", &args, &fetcher)
                .await
                .unwrap();
            assert!(read.was_cache_miss());
        }
        let balance = cache
            .read_through(&user, "GetBalance", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(balance.was_cache_miss());

        let me = cache
            .read_through(&user, "GetMe", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(me.was_cache_hit());
    }

    #[tokio::test]
    async fn test_invalidation_is_user_scoped() {
        let cache = standard_cache();
        let fetcher = MockFetcher::new(json!([]));
        let (alice, bob) = (user(), user());

        for u in [&alice, &bob] {
            cache
                .read_through(u, "GetDebts", &ArgMap::new(), &fetcher)
                .await
                .unwrap();
        }

        let outcome = cache.invalidate_after_write(&alice, "UpdateDebt").await;
        assert_eq!(outcome.targets, 5);
        assert_eq!(outcome.evicted, 1);

        let alice_read = cache
            .read_through(&alice, "GetDebts", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(alice_read.was_cache_miss());

        let bob_read = cache
            .read_through(&bob, "GetDebts", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(bob_read.was_cache_hit());
    }

    #[tokio::test]
    async fn test_change_password_invalidates_nothing() {
        let cache = standard_cache();
        let fetcher = MockFetcher::new(json!({"me": {}}));
        let user = user();

        cache
            .read_through(&user, "GetMe", &ArgMap::new(), &fetcher)
            .await
            .unwrap();

        let outcome = cache.invalidate_after_write(&user, "ChangePassword").await;
        assert_eq!(outcome, InvalidationOutcome::default());

        let read = cache
            .read_through(&user, "GetMe", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(read.was_cache_hit());
    }

    #[tokio::test]
    async fn test_store_outage_fails_open_on_read() {
        let cache = OperationCache::new(Arc::new(FailingBackend), CachePolicy::standard());
        let fetcher = MockFetcher::new(json!({"expenses": []}));
        let user = user();

        let read = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(read.was_cache_miss());
        assert!(read.is_degraded());
        assert_eq!(read.value(), &json!({"expenses": []}));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_store_outage_fails_open_on_invalidation() {
        let cache = OperationCache::new(Arc::new(FailingBackend), CachePolicy::standard());
        let user = user();

        let outcome = cache.invalidate_after_write(&user, "CreateExpense").await;
        assert_eq!(outcome.targets, 4);
        assert_eq!(outcome.failures, 4);
        assert_eq!(outcome.evicted, 0);
    }

    #[tokio::test]
    async fn test_normal_reads_are_not_degraded() {
        let cache = standard_cache();
        let fetcher = MockFetcher::new(json!([]));
        let user = user();

        let miss = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(!miss.is_degraded());

        let hit = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(!hit.is_degraded());
    }

    #[tokio::test]
    async fn test_corrupt_entry_treated_as_miss() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = OperationCache::new(Arc::clone(&backend), CachePolicy::standard());
        let fetcher = MockFetcher::new(json!([]));
        let user = user();

        let key = OperationKey::new(&user, "GetExpenses", &ArgMap::new()).render();
        backend
            .put(&key, b"not json", Duration::from_secs(60))
            .await
            .unwrap();

        let read = cache
            .read_through(&user, "GetExpenses", &ArgMap::new(), &fetcher)
            .await
            .unwrap();
        assert!(read.was_cache_miss());
        assert!(read.is_degraded());
        assert_eq!(fetcher.calls(), 1);
    }
}
