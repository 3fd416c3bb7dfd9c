//! Best-effort cache interface.
//!
//! A cache speeds up reads of counter aggregates. It is never authoritative:
//! a miss means "unknown", not zero, and every error is recoverable by going
//! back to the store.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by a cache adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The cache could not be reached.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// A key/value cache of counter aggregates with per-entry TTL.
pub trait Cache: Send + Sync {
    /// Returns the live value under `key`, `None` on miss or expiry.
    fn get(&self, key: &str) -> Result<Option<i64>, CacheError>;

    /// Stores `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: i64, ttl: Duration) -> Result<(), CacheError>;

    /// Adds `delta` to the value under `key` if a live entry exists.
    ///
    /// Returns `false`, without creating an entry, when the key is absent.
    fn increment_existing(&self, key: &str, delta: i64) -> Result<bool, CacheError>;
}

/// A cache that never holds anything.
///
/// Every [`Cache::get`] misses, so reads always go to the store.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use shardcount::adapters::{Cache, NoCache};
///
/// let cache = NoCache;
/// cache.set("k", 1, Duration::from_secs(60)).unwrap();
/// assert_eq!(cache.get("k").unwrap(), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _key: &str) -> Result<Option<i64>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: i64, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    fn increment_existing(&self, _key: &str, _delta: i64) -> Result<bool, CacheError> {
        Ok(false)
    }
}
