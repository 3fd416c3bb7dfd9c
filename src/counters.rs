//! Persistent counter records and the naming scheme shared by the stores.
//!
//! A logical counter is split over several [`CounterShard`] records so that
//! concurrent writers rarely touch the same record. A single
//! [`CounterConfig`] per counter says how many shards writers may choose
//! from.
//!
//! ```text
//!                        ┌──────────────────────────────┐
//!   increment("hits") ─► │ CounterConfig "hits" shards=3│
//!                        └──────────────┬───────────────┘
//!                          random index │
//!              ┌────────────────────────┼────────────────────────┐
//!              ▼                        ▼                        ▼
//!     ┌─────────────────┐      ┌─────────────────┐      ┌─────────────────┐
//!     │ hits-shard0  12 │      │ hits-shard1   7 │      │ hits-shard2   — │
//!     └─────────────────┘      └─────────────────┘      └─────────────────┘
//!              │                        │              (absent, counts 0)
//!              └───────── count() sums all shards ──────────┘
//! ```
//!
//! The aggregate is cached under [`cache_key`] for [`DEFAULT_CACHE_TTL`] so
//! that hot counters are read without a shard scan.

pub mod config;
pub mod service;
pub mod shards;

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of shards a counter gets on its first increment.
pub const DEFAULT_SHARDS: usize = 20;

/// How long a cached aggregate stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

const CACHE_KEY_PREFIX: &str = "CounterShard:";

/// Returns the cache key holding the aggregate of counter `name`.
///
/// # Examples
///
/// ```rust
/// use shardcount::counters::cache_key;
///
/// assert_eq!(cache_key("hits"), "CounterShard:hits");
/// ```
pub fn cache_key(name: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{name}")
}

/// Per-counter metadata: how many shards writers may pick from.
///
/// The shard count never decreases over the life of a counter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CounterConfig {
    /// The counter this config belongs to.
    pub name: String,
    /// Number of shards currently allocated.
    pub shards: usize,
}

impl CounterConfig {
    /// Creates a config for `name` with `shards` shards.
    pub fn new(name: impl Into<String>, shards: usize) -> Self {
        Self {
            name: name.into(),
            shards,
        }
    }
}

/// One slice of a counter's value.
///
/// `(name, shard_index)` identifies the record; `name` alone is shared by
/// every shard of the same counter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CounterShard {
    /// The owning counter.
    pub name: String,
    /// Position of this shard in `[0, shards)`.
    pub shard_index: usize,
    /// Accumulated value of every increment that landed here.
    pub count: i64,
}

impl CounterShard {
    /// Creates an empty shard.
    pub fn new(name: impl Into<String>, shard_index: usize) -> Self {
        Self {
            name: name.into(),
            shard_index,
            count: 0,
        }
    }
}
