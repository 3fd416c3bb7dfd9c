//! In-process [`Cache`] with per-entry expiry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::cache::{Cache, CacheError};

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: i64,
    // `None` when `now + ttl` overflows `Instant`.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(at) => now < at,
            None => true,
        }
    }
}

/// A TTL cache kept in process memory.
///
/// Expired entries behave like missing ones. They are dropped when next
/// touched, and every [`set`](Cache::set) sweeps out all of them, so keys
/// that are never read again do not pile up.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use shardcount::adapters::{Cache, MemoryCache};
///
/// let cache = MemoryCache::new();
/// cache.set("hits", 7, Duration::from_secs(60)).unwrap();
/// assert!(cache.increment_existing("hits", 3).unwrap());
/// assert_eq!(cache.get("hits").unwrap(), Some(10));
///
/// // No entry is created for unknown keys.
/// assert!(!cache.increment_existing("misses", 1).unwrap());
/// assert_eq!(cache.get("misses").unwrap(), None);
/// ```
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the entry under `key`, if any.
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.lock() {
            entries.remove(key);
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.lock() {
            entries.clear();
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Unavailable("memory cache lock poisoned".to_string()))
    }

    /// Returns the live entry under `key`, evicting it if expired.
    fn live_entry<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
        let now = Instant::now();
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<i64>, CacheError> {
        let mut entries = self.lock()?;
        Ok(Self::live_entry(&mut entries, key).map(|entry| entry.value))
    }

    fn set(&self, key: &str, value: i64, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let entry = Entry {
            value,
            expires_at: now.checked_add(ttl),
        };
        let mut entries = self.lock()?;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn increment_existing(&self, key: &str, delta: i64) -> Result<bool, CacheError> {
        let mut entries = self.lock()?;
        match Self::live_entry(&mut entries, key) {
            Some(entry) => {
                entry.value = entry.value.saturating_add(delta);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_miss_on_empty() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("hits").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache.set("hits", -4, MINUTE).unwrap();
        assert_eq!(cache.get("hits").unwrap(), Some(-4));
    }

    #[test]
    fn test_set_overwrites() {
        let cache = MemoryCache::new();
        cache.set("hits", 1, MINUTE).unwrap();
        cache.set("hits", 2, MINUTE).unwrap();
        assert_eq!(cache.get("hits").unwrap(), Some(2));
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = MemoryCache::new();
        cache.set("hits", 1, Duration::ZERO).unwrap();
        assert_eq!(cache.get("hits").unwrap(), None);
    }

    #[test]
    fn test_entry_expires() {
        let cache = MemoryCache::new();
        cache.set("hits", 1, Duration::from_millis(20)).unwrap();
        assert_eq!(cache.get("hits").unwrap(), Some(1));
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("hits").unwrap(), None);
    }

    #[test]
    fn test_increment_existing_ignores_expired() {
        let cache = MemoryCache::new();
        cache.set("hits", 1, Duration::ZERO).unwrap();
        assert!(!cache.increment_existing("hits", 5).unwrap());
        assert_eq!(cache.get("hits").unwrap(), None);
    }

    #[test]
    fn test_increment_existing_saturates() {
        let cache = MemoryCache::new();
        cache.set("hits", i64::MAX, MINUTE).unwrap();
        assert!(cache.increment_existing("hits", 1).unwrap());
        assert_eq!(cache.get("hits").unwrap(), Some(i64::MAX));
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache.set("hits", 3, Duration::MAX).unwrap();
        assert_eq!(cache.get("hits").unwrap(), Some(3));
    }

    #[test]
    fn test_set_sweeps_expired_entries() {
        let cache = MemoryCache::new();
        cache.set("Enqueue2026-10-15", 9, Duration::ZERO).unwrap();
        cache.set("Enqueue2026-10-16", 3, MINUTE).unwrap();
        cache.set("Enqueue", 12, MINUTE).unwrap();

        let entries = cache.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(!entries.contains_key("Enqueue2026-10-15"));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = MemoryCache::new();
        cache.set("a", 1, MINUTE).unwrap();
        cache.set("b", 2, MINUTE).unwrap();

        cache.invalidate("a");
        assert_eq!(cache.get("a").unwrap(), None);
        assert_eq!(cache.get("b").unwrap(), Some(2));

        cache.clear();
        assert_eq!(cache.get("b").unwrap(), None);
    }
}
