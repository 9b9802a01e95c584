//! FINCACHE Storage - Read-Through Operation Cache
//!
//! A query-result cache for named GraphQL operations, keyed by user, with
//! per-operation TTLs and a static dependency table mapping each mutation to
//! the set of cached queries it invalidates.
//!
//! # Design Philosophy
//!
//! The cache is a performance optimization, never a correctness dependency:
//! every store failure fails open. A lookup error falls through to the
//! authoritative fetch; a populate or purge error is logged and surfaced only
//! as a degraded flag. Only backend (fetcher) errors reach the caller.
//!
//! # User Isolation
//!
//! [`OperationKey`] cannot be constructed without a user id, so every cache
//! entry is user-scoped by construction. Invalidation purges by
//! (user, operation) group prefix and never touches another user's entries.
//!
//! # Example
//!
//! ```ignore
//! let cache = OperationCache::new(Arc::new(backend), CachePolicy::standard());
//!
//! // Read through the cache; the fetcher is only called on a miss.
//! let read = cache.read_through(&user_id, "GetExpenses", &args, &fetcher).await?;
//! if read.was_cache_hit() {
//!     // served from cache, within the operation's TTL
//! }
//!
//! // After a committed mutation, drop every query it can make stale.
//! cache.invalidate_after_write(&user_id, "CreateExpense").await;
//! ```

pub mod memory_backend;
pub mod op_key;
pub mod outcome;
pub mod policy;
pub mod read_through;
pub mod redis_backend;
pub mod traits;

pub use memory_backend::MemoryBackend;
pub use op_key::OperationKey;
pub use outcome::{CacheRead, StoreLookup};
pub use policy::CachePolicy;
pub use read_through::{BackendFetcher, InvalidationOutcome, OperationCache};
pub use redis_backend::RedisBackend;
pub use traits::{CacheBackend, CacheStats};
