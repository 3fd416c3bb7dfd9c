//! # Shardcount - Store-Backed Sharded Counters
//!
//! A Rust library for named counters that take a high rate of concurrent
//! increments while living in a transactional persistent store. It implements
//! the **sharded counter pattern** on top of store records, and keeps reads
//! cheap with a read-through cache.
//!
//! ## The Problem
//!
//! Keeping a counter as one record in a transactional store is correct but
//! does not scale: every increment is a read-modify-write of the same record,
//! so concurrent writers keep invalidating each other's transactions and
//! spend their time retrying.
//!
//! ## The Solution: Sharded Counters
//!
//! Each counter is split over several **shard records** (20 by default).
//! Every increment picks one shard uniformly at random and updates only that
//! record, in its own transaction. Writers of the same counter rarely touch
//! the same shard, so they rarely conflict.
//!
//! ### Design Principles
//!
//! 1. **No shared in-process state**: [`CounterService`] only holds handles
//!    to its collaborators. All coordination goes through store transactions,
//!    so writers may live in different processes or hosts.
//!
//! 2. **Lazy, idempotent bootstrap**: a counter's config record is created
//!    inside a transaction on its first increment; racing first writers
//!    converge on one record.
//!
//! 3. **Aggregation on read, cached**: the counter value is the sum of its
//!    shards. The sum is cached for a fixed TTL (60 s by default), so reads
//!    of hot counters cost a single cache lookup and are stale by at most
//!    the TTL.
//!
//! 4. **Best-effort cache**: cache errors are logged and ignored. Only store
//!    errors reach the caller.
//!
//! ```text
//!   increment(name, by)                    count(name)
//!          │                                    │
//!          ▼                                    ▼
//!   config: get or create ──► shards    cache hit? ──yes──► value
//!          │                                    │ no
//!          ▼                                    ▼
//!   shard[rand(0..shards)] += by        sum all shards ──► cache.set(ttl)
//!          │
//!          ▼
//!   cache.increment_existing(by)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use shardcount::adapters::{MemoryCache, MemoryStore};
//! use shardcount::CounterService;
//!
//! let counters = CounterService::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryCache::new()),
//! );
//!
//! counters.increment("requests", 1).unwrap();
//! counters.increment("requests", 5).unwrap();
//! assert_eq!(counters.count("requests").unwrap(), 6);
//!
//! // Hot counter: spread future writes over more shards.
//! counters.increase_shards("requests", 50).unwrap();
//!
//! assert_eq!(counters.counter_names().unwrap(), vec!["requests"]);
//! ```
//!
//! ## Bringing Your Own Store
//!
//! Implement [`Store`](adapters::Store) and [`Cache`](adapters::Cache) for
//! your backends. The store must provide single-key transactions that are
//! retried on write conflict, and a query of records by counter name.
//!
//! ## Logging
//!
//! The library logs through [`tracing`] and never installs a subscriber.
//! Cache hits and misses, shard updates and config bootstraps are logged at
//! `debug`, shard count increases at `info`, cache failures at `warn`.
//!
//! ## Observers
//!
//! Optional renderers for [`CounterService::totals`] are gated behind feature
//! flags:
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `table` | [`observers::table`] | Pretty-print totals as tables |
//! | `json` | [`observers::json`] | Serialize totals to JSON |
//! | `full` | All observers | Enables all observer modules |

pub mod adapters;
pub mod counters;
pub mod daily;
pub mod error;
pub mod observers;
pub mod snapshot;

pub use counters::service::{CacheAdjust, CounterService, CounterServiceConfig};
pub use error::{CounterError, Result};
