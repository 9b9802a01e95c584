//! Cache backend trait and statistics.
//!
//! The backend abstracts over the external key-value store (Redis in
//! production, an in-process map in tests and single-node deployments).
//! Implementations must be thread-safe and support concurrent access.

use async_trait::async_trait;
use fincache_core::StoreResult;
use std::time::Duration;

/// Pluggable cache store.
///
/// # Key Format
///
/// Keys are opaque strings produced by
/// [`OperationKey`](crate::op_key::OperationKey); backends never interpret
/// them beyond prefix matching in [`purge_prefix`](CacheBackend::purge_prefix).
///
/// # TTL
///
/// `put` attaches a TTL; a backend must never serve an entry past it. Lazy
/// expiry on read and proactive eviction are both acceptable.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get the raw entry stored under a key, if a live one exists.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store an entry under a key with the given TTL, replacing any prior
    /// entry wholesale.
    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()>;

    /// Delete the entry under a key. Returns the number of entries removed.
    async fn delete(&self, key: &str) -> StoreResult<u64>;

    /// Delete every entry in a (user, operation) group.
    ///
    /// Removes the key exactly equal to `prefix` (the no-argument variant)
    /// and every key beginning with `prefix` followed by `:` (every argument
    /// variant). Returns the number of entries removed.
    async fn purge_prefix(&self, prefix: &str) -> StoreResult<u64>;

    /// Get usage statistics.
    async fn stats(&self) -> StoreResult<CacheStats>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in the store (0 when unknown).
    pub entry_count: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
