//! Collaborator interfaces consumed by the counter service.
//!
//! The service never keeps counter state in process memory. It talks to two
//! collaborators through the traits in this module:
//!
//! | Trait | Role | Failure policy |
//! |-------|------|----------------|
//! | [`Store`] | Transactional, authoritative record storage | Errors reach the caller |
//! | [`Cache`] | TTL cache of aggregates | Errors are logged and ignored |
//!
//! In-process implementations are provided for tests, benchmarks and
//! single-process use:
//!
//! | Adapter | Implements | Notes |
//! |---------|------------|-------|
//! | [`MemoryStore`] | [`Store`] | Optimistic concurrency, retry on conflict |
//! | [`MemoryCache`] | [`Cache`] | Lazy expiry |
//! | [`NoCache`] | [`Cache`] | Always misses |
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
//! counters.increment("requests", 1).unwrap();
//! assert_eq!(counters.count("requests").unwrap(), 1);
//! ```

mod cache;
mod memory_cache;
mod memory_store;
mod store;

pub use cache::{Cache, CacheError, NoCache};
pub use memory_cache::MemoryCache;
pub use memory_store::{MemoryStore, DEFAULT_MAX_ATTEMPTS};
pub use store::{Filter, Key, Kind, Record, Records, Store, StoreError, Transaction};
