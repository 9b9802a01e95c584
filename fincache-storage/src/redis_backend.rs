//! Redis-backed cache implementation.
//!
//! TTLs are enforced server-side with `SET .. EX`; group purges delete the
//! exact no-argument key and `SCAN` for the argument variants. Hit/miss
//! counters are kept locally since Redis is shared with other consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fincache_core::{StoreError, StoreResult};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, ErrorKind};

use crate::traits::{CacheBackend, CacheStats};

/// Redis cache backend.
pub struct RedisBackend {
    client: Client,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RedisBackend {
    /// Create a backend for the given connection URL without connecting.
    ///
    /// Connections are established lazily per command; a Redis that is down
    /// at construction time only degrades later operations.
    pub fn new(url: &str) -> StoreResult<Self> {
        let client = Client::open(url).map_err(store_err)?;
        Ok(Self {
            client,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Create a backend and verify the connection with a `PING`.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let backend = Self::new(url)?;
        let mut conn = backend.conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(backend)
    }

    async fn conn(&self) -> StoreResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(store_err)
    }
}

fn store_err(err: redis::RedisError) -> StoreError {
    if err.is_connection_refusal() || err.is_io_error() || err.kind() == ErrorKind::AuthenticationFailed {
        StoreError::Connection {
            reason: err.to_string(),
        }
    } else {
        StoreError::Command {
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(store_err)?;
        match &value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        Ok(value)
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        // SET EX rejects 0; sub-second TTLs round up to one second.
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, seconds).await.map_err(store_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let removed: u64 = conn.del(key).await.map_err(store_err)?;
        Ok(removed)
    }

    async fn purge_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let mut removed: u64 = conn.del(prefix).await.map_err(store_err)?;

        let pattern = format!("{prefix}:*");
        let keys: Vec<String> = {
            let mut iter = conn
                .scan_match::<_, String>(&pattern)
                .await
                .map_err(store_err)?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if !keys.is_empty() {
            let count: u64 = conn.del(keys).await.map_err(store_err)?;
            removed += count;
        }
        Ok(removed)
    }

    async fn stats(&self) -> StoreResult<CacheStats> {
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            // Entry counts live server-side and are shared with other
            // consumers; not reported here.
            entry_count: 0,
            evictions: 0,
        })
    }
}
