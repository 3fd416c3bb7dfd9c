//! The sharded counter service.
//!
//! [`CounterService`] ties the config and shard records together with a
//! read-through cache of aggregates:
//!
//! - [`increment`](CounterService::increment) bootstraps the counter's config,
//!   picks a shard uniformly at random and updates it in its own
//!   transaction. Writers of the same counter rarely pick the same shard, so
//!   they rarely conflict.
//! - [`count`](CounterService::count) serves the cached aggregate when there
//!   is one and otherwise sums every shard, caching the result for the
//!   configured TTL.
//!
//! Reads are therefore stale by at most the cache TTL. Cache failures only
//! cost latency: they are logged and the store is used instead.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use shardcount::adapters::{MemoryCache, MemoryStore};
//! use shardcount::counters::service::CounterService;
//!
//! let counters = CounterService::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryCache::new()),
//! );
//!
//! counters.increment("hits", 3).unwrap();
//! counters.increment("hits", 4).unwrap();
//! assert_eq!(counters.count("hits").unwrap(), 7);
//!
//! counters.increase_shards("hits", 50).unwrap();
//! assert_eq!(counters.shard_count("hits").unwrap(), Some(50));
//! ```

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::adapters::{Cache, Store};
use crate::counters::config::ConfigStore;
use crate::counters::shards::ShardStore;
use crate::counters::{cache_key, DEFAULT_CACHE_TTL, DEFAULT_SHARDS};
use crate::daily::daily_name;
use crate::error::Result;
use crate::snapshot::{current_timestamp_ms, CounterSnapshot, MetricsSnapshot};

/// How an increment updates an existing cached aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheAdjust {
    /// Add the increment's real amount.
    #[default]
    ByAmount,
    /// Add 1 whatever the amount, leaving the entry approximate until it
    /// expires.
    Unit,
    /// Leave the cache alone and wait for the entry to expire.
    Disabled,
}

impl CacheAdjust {
    fn delta(&self, by: i64) -> Option<i64> {
        match self {
            CacheAdjust::ByAmount => Some(by),
            CacheAdjust::Unit => Some(1),
            CacheAdjust::Disabled => None,
        }
    }
}

/// Configuration for [`CounterService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterServiceConfig {
    /// Shards given to a counter on its first increment.
    pub default_shards: usize,
    /// Lifetime of a cached aggregate.
    pub cache_ttl: Duration,
    /// Cache update performed after each increment.
    pub cache_adjust: CacheAdjust,
}

impl Default for CounterServiceConfig {
    fn default() -> Self {
        Self {
            default_shards: DEFAULT_SHARDS,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_adjust: CacheAdjust::default(),
        }
    }
}

/// Named counters sharded over a transactional store, with cached reads.
///
/// The service holds no counter state of its own, only handles to its
/// collaborators, so any number of services (in any number of processes)
/// may share the same store and cache.
pub struct CounterService<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
    config: CounterServiceConfig,
}

impl<S: Store, C: Cache> CounterService<S, C> {
    /// Creates a service with the default configuration.
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self::with_config(store, cache, CounterServiceConfig::default())
    }

    /// Creates a service with the given configuration.
    pub fn with_config(store: Arc<S>, cache: Arc<C>, config: CounterServiceConfig) -> Self {
        let mut config = config;
        config.default_shards = config.default_shards.max(1);
        Self {
            store,
            cache,
            config,
        }
    }

    /// Sets the shard count given to new counters (at least 1).
    pub fn with_default_shards(mut self, shards: usize) -> Self {
        self.config.default_shards = shards.max(1);
        self
    }

    /// Sets the lifetime of cached aggregates.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    /// Sets how increments update cached aggregates.
    pub fn with_cache_adjust(mut self, adjust: CacheAdjust) -> Self {
        self.config.cache_adjust = adjust;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &CounterServiceConfig {
        &self.config
    }

    /// Returns the value of counter `name`.
    ///
    /// A counter that was never incremented is 0. The value may lag recent
    /// increments by up to the cache TTL.
    pub fn count(&self, name: &str) -> Result<i64> {
        let key = cache_key(name);
        match self.cache.get(&key) {
            Ok(Some(total)) => {
                debug!(counter = %name, total, "cache hit");
                return Ok(total);
            }
            Ok(None) => debug!(counter = %name, "cache miss"),
            Err(err) => warn!(counter = %name, error = %err, "cache read failed"),
        }

        let total = self.shards().sum(name)?;

        if let Err(err) = self.cache.set(&key, total, self.config.cache_ttl) {
            warn!(counter = %name, error = %err, "cache write failed");
        }
        Ok(total)
    }

    /// Adds `by` to counter `name`.
    ///
    /// The first increment of a counter creates its config with the default
    /// shard count. Store failures are returned once the store's own retry
    /// policy gives up.
    pub fn increment(&self, name: &str, by: i64) -> Result<()> {
        let config = self.configs().get_or_create(name)?;

        let shard = rand::rng().random_range(0..config.shards);
        let count = self.shards().add(name, shard, by)?;
        debug!(counter = %name, shard, by, count, "shard updated");

        self.adjust_cache(name, by);
        Ok(())
    }

    /// Makes at least `n` shards available to future increments of `name`.
    ///
    /// Never lowers the shard count; creates the config with the default
    /// shard count if absent. Existing shard values are left untouched.
    pub fn increase_shards(&self, name: &str, n: usize) -> Result<()> {
        let (config, modified) = self.configs().raise_to(name, n)?;
        if modified {
            info!(counter = %name, shards = config.shards, "shard count raised");
        } else {
            debug!(counter = %name, shards = config.shards, requested = n, "shard count unchanged");
        }
        Ok(())
    }

    /// Names of every counter incremented (or configured) at least once.
    ///
    /// Order is unspecified.
    pub fn counter_names(&self) -> Result<Vec<String>> {
        self.configs().names()
    }

    /// Current shard count of `name`, `None` if it has no config yet.
    pub fn shard_count(&self, name: &str) -> Result<Option<usize>> {
        Ok(self.configs().get(name)?.map(|config| config.shards))
    }

    /// Every counter with its value, sorted by name.
    ///
    /// Fails on the first counter that cannot be read.
    pub fn totals(&self) -> Result<Vec<CounterSnapshot>> {
        let mut names = self.counter_names()?;
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let value = self.count(&name)?;
                Ok(CounterSnapshot::new(name, value))
            })
            .collect()
    }

    /// [`totals`](Self::totals) stamped with the current time.
    pub fn snapshot(&self) -> Result<MetricsSnapshot> {
        Ok(MetricsSnapshot::with_timestamp(
            self.totals()?,
            current_timestamp_ms(),
        ))
    }

    /// Adds `by` to the all-time counter `name` and to its per-day
    /// counter for the date of `now`.
    ///
    /// Both increments are attempted even if the first one fails. The first
    /// error is returned.
    pub fn increment_with_daily(&self, name: &str, now: OffsetDateTime, by: i64) -> Result<()> {
        let day = daily_name(name, now)?;
        let all_time = self.increment(name, by);
        if let Err(err) = &all_time {
            warn!(counter = %name, error = %err, "all-time increment failed");
        }
        let daily = self.increment(&day, by);
        all_time.and(daily)
    }

    /// Value of the per-day counter of `name` for the date of `now`.
    pub fn count_for_day(&self, name: &str, now: OffsetDateTime) -> Result<i64> {
        self.count(&daily_name(name, now)?)
    }

    fn configs(&self) -> ConfigStore<'_, S> {
        ConfigStore::new(self.store.as_ref(), self.config.default_shards)
    }

    fn shards(&self) -> ShardStore<'_, S> {
        ShardStore::new(self.store.as_ref())
    }

    fn adjust_cache(&self, name: &str, by: i64) {
        let Some(delta) = self.config.cache_adjust.delta(by) else {
            return;
        };
        if delta == 0 {
            return;
        }
        match self.cache.increment_existing(&cache_key(name), delta) {
            Ok(adjusted) => debug!(counter = %name, delta, adjusted, "cache adjusted"),
            Err(err) => warn!(counter = %name, error = %err, "cache adjust failed"),
        }
    }
}

impl<S, C> Clone for CounterService<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
        }
    }
}

impl<S, C> std::fmt::Debug for CounterService<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Filter, Kind, MemoryCache, MemoryStore, NoCache, Record};
    use std::thread;
    use time::macros::datetime;

    fn service() -> (CounterService<MemoryStore, MemoryCache>, Arc<MemoryStore>, Arc<MemoryCache>) {
        let store = Arc::new(MemoryStore::new().with_max_attempts(100));
        let cache = Arc::new(MemoryCache::new());
        let service = CounterService::new(Arc::clone(&store), Arc::clone(&cache));
        (service, store, cache)
    }

    fn shard_indices(store: &MemoryStore, name: &str) -> Vec<usize> {
        store
            .query(Kind::Shard, &Filter::NameEq(name.to_string()))
            .unwrap()
            .map(|record| match record.unwrap() {
                Record::Shard(shard) => shard.shard_index,
                Record::Config(_) => panic!("config record in shard query"),
            })
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = CounterServiceConfig::default();
        assert_eq!(config.default_shards, 20);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.cache_adjust, CacheAdjust::ByAmount);
    }

    #[test]
    fn test_builder() {
        let (service, _, _) = service();
        let service = service
            .with_default_shards(0)
            .with_cache_ttl(Duration::from_secs(5))
            .with_cache_adjust(CacheAdjust::Disabled);
        assert_eq!(service.config().default_shards, 1);
        assert_eq!(service.config().cache_ttl, Duration::from_secs(5));
        assert_eq!(service.config().cache_adjust, CacheAdjust::Disabled);
    }

    #[test]
    fn test_count_unknown_is_zero() {
        let (service, store, _) = service();
        assert_eq!(service.count("never").unwrap(), 0);
        assert_eq!(service.shard_count("never").unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_increment_then_count() {
        let (service, _, _) = service();
        service.increment("hits", 3).unwrap();
        service.increment("hits", 4).unwrap();
        assert_eq!(service.count("hits").unwrap(), 7);
    }

    #[test]
    fn test_first_increment_creates_config() {
        let (service, _, _) = service();
        service.increment("foo", 5).unwrap();
        assert_eq!(service.shard_count("foo").unwrap(), Some(DEFAULT_SHARDS));
        assert_eq!(service.counter_names().unwrap(), vec!["foo"]);
    }

    #[test]
    fn test_count_populates_cache() {
        let (service, _, cache) = service();
        service.increment("hits", 2).unwrap();
        assert_eq!(cache.get(&cache_key("hits")).unwrap(), None);

        assert_eq!(service.count("hits").unwrap(), 2);
        assert_eq!(cache.get(&cache_key("hits")).unwrap(), Some(2));
    }

    #[test]
    fn test_cache_hit_skips_store() {
        let (service, _, cache) = service();
        cache
            .set(&cache_key("hits"), 42, Duration::from_secs(60))
            .unwrap();
        assert_eq!(service.count("hits").unwrap(), 42);
    }

    #[test]
    fn test_increment_adjusts_cache_by_amount() {
        let (service, _, cache) = service();
        service.increment("hits", 1).unwrap();
        assert_eq!(service.count("hits").unwrap(), 1);

        service.increment("hits", 10).unwrap();
        assert_eq!(cache.get(&cache_key("hits")).unwrap(), Some(11));
        assert_eq!(service.count("hits").unwrap(), 11);
    }

    #[test]
    fn test_increment_adjusts_cache_by_unit() {
        let (service, _, cache) = service();
        let service = service.with_cache_adjust(CacheAdjust::Unit);
        service.increment("hits", 1).unwrap();
        service.count("hits").unwrap();

        service.increment("hits", 10).unwrap();
        assert_eq!(cache.get(&cache_key("hits")).unwrap(), Some(2));

        cache.clear();
        assert_eq!(service.count("hits").unwrap(), 11);
    }

    #[test]
    fn test_increment_without_cache_adjust() {
        let (service, _, cache) = service();
        let service = service.with_cache_adjust(CacheAdjust::Disabled);
        service.increment("hits", 1).unwrap();
        service.count("hits").unwrap();

        service.increment("hits", 10).unwrap();
        assert_eq!(cache.get(&cache_key("hits")).unwrap(), Some(1));
    }

    #[test]
    fn test_increment_does_not_create_cache_entry() {
        let (service, _, cache) = service();
        service.increment("hits", 1).unwrap();
        assert_eq!(cache.get(&cache_key("hits")).unwrap(), None);
    }

    #[test]
    fn test_negative_increment() {
        let store = Arc::new(MemoryStore::new());
        let service = CounterService::new(store, Arc::new(NoCache));
        service.increment("balance", 10).unwrap();
        service.increment("balance", -25).unwrap();
        assert_eq!(service.count("balance").unwrap(), -15);
    }

    #[test]
    fn test_increase_shards_never_decreases() {
        let (service, _, _) = service();
        service.increase_shards("hits", 50).unwrap();
        service.increase_shards("hits", 30).unwrap();
        assert_eq!(service.shard_count("hits").unwrap(), Some(50));
    }

    #[test]
    fn test_increase_shards_below_default_creates_default() {
        let (service, _, _) = service();
        service.increase_shards("hits", 1).unwrap();
        assert_eq!(service.shard_count("hits").unwrap(), Some(DEFAULT_SHARDS));
    }

    #[test]
    fn test_shard_indices_within_range() {
        let (service, store, _) = service();
        let service = service.with_default_shards(4);
        for _ in 0..200 {
            service.increment("hits", 1).unwrap();
        }
        let indices = shard_indices(&store, "hits");
        assert!(!indices.is_empty());
        assert!(indices.iter().all(|&i| i < 4));
        // 200 uniform draws over 4 shards all but surely hit more than one.
        assert!(indices.len() > 1);
    }

    #[test]
    fn test_totals_and_snapshot() {
        let (service, _, _) = service();
        service.increment("b", 2).unwrap();
        service.increment("a", 1).unwrap();

        let totals = service.totals().unwrap();
        assert_eq!(
            totals,
            vec![CounterSnapshot::new("a", 1), CounterSnapshot::new("b", 2)]
        );

        let snapshot = service.snapshot().unwrap();
        assert!(snapshot.timestamp_ms.is_some());
        assert_eq!(snapshot.total(), 3);
    }

    #[test]
    fn test_increment_with_daily() {
        let (service, _, _) = service();
        let now = datetime!(2026-10-16 13:45 UTC);
        service.increment_with_daily("Enqueue", now, 2).unwrap();
        service.increment_with_daily("Enqueue", now, 3).unwrap();

        assert_eq!(service.count("Enqueue").unwrap(), 5);
        assert_eq!(service.count("Enqueue2026-10-16").unwrap(), 5);
        assert_eq!(service.count_for_day("Enqueue", now).unwrap(), 5);

        let mut names = service.counter_names().unwrap();
        names.sort();
        assert_eq!(names, vec!["Enqueue", "Enqueue2026-10-16"]);
    }

    #[test]
    fn test_clone_shares_collaborators() {
        let (service, _, _) = service();
        let other = service.clone();
        service.increment("hits", 1).unwrap();
        assert_eq!(other.count("hits").unwrap(), 1);
    }

    #[test]
    fn test_multiple_threads() {
        let (service, _, _) = service();
        let mut handles = vec![];

        for _ in 0..4 {
            let service = service.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    service.increment("hits", 1).unwrap();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(service.count("hits").unwrap(), 200);
    }
}
