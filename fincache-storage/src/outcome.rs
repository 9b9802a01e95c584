//! Tagged outcomes for cache reads.
//!
//! Store failures are part of the cache's normal vocabulary, not exceptions:
//! [`StoreLookup`] keeps the fail-open contract visible in the type, and
//! [`CacheRead`] carries hit/miss provenance so callers can log what the
//! cache did without branching on it.

use chrono::{DateTime, Utc};
use fincache_core::StoreError;
use std::time::Duration;

/// Outcome of a single store lookup.
///
/// `Unavailable` is not an error to the caller: the read-through layer falls
/// through to the authoritative fetch and records the degradation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLookup {
    /// A live entry was found.
    Hit(Vec<u8>),
    /// No entry (or an expired one) exists under the key.
    Miss,
    /// The store could not answer.
    Unavailable(StoreError),
}

impl StoreLookup {
    /// Returns true if this lookup found a live entry.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Result of a read through the cache, carrying provenance metadata.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    /// The response payload.
    value: T,
    /// When the payload was cached (hit) or fetched (miss).
    cached_at: DateTime<Utc>,
    /// Whether this was a cache hit or a fetch from the backend.
    was_cache_hit: bool,
    /// Whether a store failure was swallowed while serving this read.
    degraded: bool,
}

impl<T> CacheRead<T> {
    /// Create a cache read from a cache hit.
    pub fn from_cache(value: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at,
            was_cache_hit: true,
            degraded: false,
        }
    }

    /// Create a cache read from an authoritative fetch (cache miss).
    pub fn from_backend(value: T) -> Self {
        Self {
            value,
            cached_at: Utc::now(),
            was_cache_hit: false,
            degraded: false,
        }
    }

    /// Mark this read as having swallowed a store failure.
    pub fn with_degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    /// Consume the wrapper and return the payload.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Get a reference to the payload.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// When the payload was cached (for hits) or fetched (for misses).
    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// How stale the payload is.
    pub fn staleness(&self) -> Duration {
        let now = Utc::now();
        if now > self.cached_at {
            (now - self.cached_at).to_std().unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }

    /// Check if this was a cache hit.
    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    /// Check if this was a cache miss (fetched from the backend).
    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    /// Whether a store failure was swallowed while serving this read.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Map the payload to a new type, preserving provenance.
    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            cached_at: self.cached_at,
            was_cache_hit: self.was_cache_hit,
            degraded: self.degraded,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}
