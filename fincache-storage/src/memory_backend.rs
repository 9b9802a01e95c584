//! In-process cache backend.
//!
//! A capacity-bounded `HashMap` store for tests and single-node deployments.
//! Expiry is lazy: an entry past its TTL is removed (and reported as a miss)
//! the next time its key is read. When the map reaches capacity, expired
//! entries are collected first; if that frees nothing, a quarter of the
//! entries is evicted.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fincache_core::{StoreError, StoreResult};

use crate::traits::{CacheBackend, CacheStats};

/// Default maximum number of entries.
const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory cache backend.
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
    max_entries: usize,
    stats: RwLock<CacheStats>,
}

impl MemoryBackend {
    /// Create a backend with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a backend bounded to `max_entries` entries.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Number of entries currently held, including not-yet-collected expired
    /// ones.
    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record_hit(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.hits += 1;
        }
    }

    fn record_miss(&self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.misses += 1;
        }
    }

    fn record_evictions(&self, count: u64) {
        if let Ok(mut stats) = self.stats.write() {
            stats.evictions += count;
        }
    }

    /// Drop expired entries; if the map is still at capacity, evict a
    /// quarter of it. Returns the number of capacity evictions.
    fn make_room(&self, map: &mut HashMap<String, Entry>, now: Instant) -> u64 {
        map.retain(|_, entry| !entry.is_expired(now));
        if map.len() < self.max_entries {
            return 0;
        }

        let victims: Vec<String> = map.keys().take(map.len() / 4 + 1).cloned().collect();
        let evicted = victims.len() as u64;
        for key in victims {
            map.remove(&key);
        }
        evicted
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let now = Instant::now();

        match map.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                let bytes = entry.bytes.clone();
                drop(map);
                self.record_hit();
                Ok(Some(bytes))
            }
            Some(_) => {
                map.remove(key);
                drop(map);
                self.record_miss();
                Ok(None)
            }
            None => {
                drop(map);
                self.record_miss();
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let now = Instant::now();

        if map.len() >= self.max_entries && !map.contains_key(key) {
            let evicted = self.make_room(&mut map, now);
            if evicted > 0 {
                self.record_evictions(evicted);
            }
        }

        map.insert(
            key.to_string(),
            Entry {
                bytes: value.to_vec(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.remove(key).map(|_| 1).unwrap_or(0))
    }

    async fn purge_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let with_separator = format!("{prefix}:");
        let before = map.len();
        map.retain(|key, _| key != prefix && !key.starts_with(&with_separator));
        Ok((before - map.len()) as u64)
    }

    async fn stats(&self) -> StoreResult<CacheStats> {
        let mut stats = self
            .stats
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone();
        stats.entry_count = self.len() as u64;
        Ok(stats)
    }
}
