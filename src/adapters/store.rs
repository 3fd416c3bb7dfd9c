//! Transactional store interface.
//!
//! The store holds two kinds of records, [`CounterConfig`] and
//! [`CounterShard`], each under a [`Key`] made of its [`Kind`] and a string
//! id. Writes happen inside [`Store::run_in_transaction`], which serializes
//! concurrent writers to the same key and retries the closure on conflict.

use std::fmt::{self, Display};

use thiserror::Error;

use crate::counters::{CounterConfig, CounterShard};

/// The kind of record stored under a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// A [`CounterConfig`] record.
    Config,
    /// A [`CounterShard`] record.
    Shard,
}

impl Kind {
    /// Returns the name under which records of this kind are stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Config => "CounterConfig",
            Kind::Shard => "CounterShard",
        }
    }
}

/// Identity of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    kind: Kind,
    name: String,
}

impl Key {
    /// Key of the config record for counter `name`.
    pub fn config(name: &str) -> Self {
        Self {
            kind: Kind::Config,
            name: name.to_string(),
        }
    }

    /// Key of shard `index` of counter `name`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shardcount::adapters::Key;
    ///
    /// assert_eq!(Key::shard("hits", 7).name(), "hits-shard7");
    /// ```
    pub fn shard(name: &str, index: usize) -> Self {
        Self {
            kind: Kind::Shard,
            name: format!("{name}-shard{index}"),
        }
    }

    /// The kind of record under this key.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The string id of this key.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.name)
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Per-counter shard configuration.
    Config(CounterConfig),
    /// One shard of a counter.
    Shard(CounterShard),
}

impl Record {
    /// The kind of this record.
    pub fn kind(&self) -> Kind {
        match self {
            Record::Config(_) => Kind::Config,
            Record::Shard(_) => Kind::Shard,
        }
    }

    /// The counter this record belongs to.
    pub fn counter_name(&self) -> &str {
        match self {
            Record::Config(config) => &config.name,
            Record::Shard(shard) => &shard.name,
        }
    }
}

/// Selects records returned by [`Store::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every record of the queried kind.
    All,
    /// Records whose counter name equals the given one.
    NameEq(String),
}

impl Filter {
    /// Returns `true` if `record` passes this filter.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::All => true,
            Filter::NameEq(name) => record.counter_name() == name,
        }
    }
}

/// Errors reported by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Concurrent writers kept invalidating the transaction.
    #[error("transaction conflict after {attempts} attempts")]
    Conflict {
        /// How many times the transaction was tried.
        attempts: u32,
    },

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Reads and writes performed inside one transaction.
pub trait Transaction {
    /// Reads the record under `key`, `None` if absent.
    fn get(&mut self, key: &Key) -> Result<Option<Record>, StoreError>;

    /// Writes `record` under `key`. Visible to others only after commit.
    fn put(&mut self, key: Key, record: Record) -> Result<(), StoreError>;
}

/// Iterator over query results.
pub type Records<'a> = Box<dyn Iterator<Item = Result<Record, StoreError>> + 'a>;

/// A keyed, transactional record store.
///
/// Implementations must be safe to share between threads; callers on other
/// hosts may be using the same backend concurrently.
pub trait Store: Send + Sync {
    /// Runs `f` in a single transaction and commits its writes.
    ///
    /// On a write conflict at commit the store re-runs `f` according to its
    /// own retry policy, so `f` must have no effects outside the
    /// transaction. An error returned by `f` aborts the transaction without
    /// retry and is returned as is.
    fn run_in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnMut(&mut dyn Transaction) -> Result<T, E>,
        E: From<StoreError>;

    /// Returns every record of `kind` passing `filter`. Order is unspecified.
    fn query(&self, kind: Kind, filter: &Filter) -> Result<Records<'_>, StoreError>;

    /// Returns the keys of every record of `kind`.
    fn query_keys(&self, kind: Kind) -> Result<Vec<Key>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        let config = Key::config("hits");
        assert_eq!(config.kind(), Kind::Config);
        assert_eq!(config.name(), "hits");

        let shard = Key::shard("hits", 19);
        assert_eq!(shard.kind(), Kind::Shard);
        assert_eq!(shard.name(), "hits-shard19");
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::config("hits").to_string(), "CounterConfig/hits");
        assert_eq!(Key::shard("hits", 0).to_string(), "CounterShard/hits-shard0");
    }

    #[test]
    fn test_filter() {
        let shard = Record::Shard(CounterShard::new("hits", 0));
        assert!(Filter::All.matches(&shard));
        assert!(Filter::NameEq("hits".to_string()).matches(&shard));
        assert!(!Filter::NameEq("hit".to_string()).matches(&shard));
    }

    #[test]
    fn test_record_kind() {
        assert_eq!(Record::Config(CounterConfig::new("a", 1)).kind(), Kind::Config);
        assert_eq!(Record::Shard(CounterShard::new("a", 0)).kind(), Kind::Shard);
    }
}
