//! Error types for cache store operations.
//!
//! Store errors are always recovered locally by the cache layer (fail-open);
//! they exist as explicit values so callers can log them, never so callers
//! can branch on them as if they were data errors.

use thiserror::Error;

/// Cache store errors.
///
/// The store is an external dependency and may be unavailable at any time.
/// Every variant is non-fatal to the operation that encountered it: a lookup
/// error falls through to the authoritative fetch, a populate or purge error
/// degrades to temporarily stale reads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store connection failed: {reason}")]
    Connection { reason: String },

    #[error("Store command failed: {reason}")]
    Command { reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type for cache store operations.
pub type StoreResult<T> = Result<T, StoreError>;
