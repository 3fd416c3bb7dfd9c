//! In-process [`Store`] with optimistic concurrency control.
//!
//! Every record carries a version that is bumped on each committed write. A
//! transaction remembers the version of every key it reads (0 for an absent
//! key) and buffers its writes. At commit the read versions are checked under
//! the write lock: if any changed, another writer got there first and the
//! whole closure is run again.
//!
//! ```text
//!   writer A: get(k)@v1 ── put(k) ── commit ✓ (k → v2)
//!   writer B: get(k)@v1 ───────── put(k) ── commit ✗ (k is v2) ── retry
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crossbeam_utils::Backoff;
use tracing::trace;

use super::store::{Filter, Key, Kind, Record, Records, Store, StoreError, Transaction};

/// Number of times a transaction is tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
struct Versioned {
    version: u64,
    record: Record,
}

/// A transactional store kept in process memory.
///
/// # Examples
///
/// ```rust
/// use shardcount::adapters::{Key, MemoryStore, Record, Store, StoreError};
/// use shardcount::counters::CounterConfig;
///
/// let store = MemoryStore::new();
/// store
///     .run_in_transaction(|tx| {
///         tx.put(Key::config("hits"), Record::Config(CounterConfig::new("hits", 20)))
///     })
///     .map_err(|e: StoreError| e)
///     .unwrap();
/// assert_eq!(store.len().unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<Key, Versioned>>,
    max_attempts: u32,
}

impl MemoryStore {
    /// Creates an empty store retrying conflicted transactions
    /// [`DEFAULT_MAX_ATTEMPTS`] times.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets how many times a conflicted transaction is tried.
    ///
    /// Values below 1 are treated as 1.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Number of stored records of every kind.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if nothing has been committed yet.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<Key, Versioned>>, StoreError> {
        self.records
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<Key, Versioned>>, StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    reads: HashMap<Key, u64>,
    writes: HashMap<Key, Record>,
}

impl<'a> MemoryTransaction<'a> {
    fn new(store: &'a MemoryStore) -> Self {
        Self {
            store,
            reads: HashMap::new(),
            writes: HashMap::new(),
        }
    }

    /// Applies the buffered writes. Returns `false` on a read-set conflict.
    fn commit(self) -> Result<bool, StoreError> {
        let store = self.store;
        let mut records = store.write()?;

        for (key, seen) in &self.reads {
            let current = records.get(key).map_or(0, |v| v.version);
            if current != *seen {
                return Ok(false);
            }
        }

        for (key, record) in self.writes {
            let version = records.get(&key).map_or(0, |v| v.version) + 1;
            records.insert(key, Versioned { version, record });
        }
        Ok(true)
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn get(&mut self, key: &Key) -> Result<Option<Record>, StoreError> {
        if let Some(record) = self.writes.get(key) {
            return Ok(Some(record.clone()));
        }

        let records = self.store.read()?;
        let found = records.get(key);
        let version = found.map_or(0, |v| v.version);
        // Keep the first observed version so re-reads can't mask a conflict.
        self.reads.entry(key.clone()).or_insert(version);
        Ok(found.map(|v| v.record.clone()))
    }

    fn put(&mut self, key: Key, record: Record) -> Result<(), StoreError> {
        self.writes.insert(key, record);
        Ok(())
    }
}

impl Store for MemoryStore {
    fn run_in_transaction<T, E, F>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut(&mut dyn Transaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        let backoff = Backoff::new();

        for attempt in 1..=self.max_attempts {
            let mut tx = MemoryTransaction::new(self);
            let value = f(&mut tx)?;
            if tx.commit()? {
                return Ok(value);
            }
            trace!(attempt, "transaction conflict");
            backoff.snooze();
        }

        Err(StoreError::Conflict {
            attempts: self.max_attempts,
        }
        .into())
    }

    fn query(&self, kind: Kind, filter: &Filter) -> Result<Records<'_>, StoreError> {
        let records = self.read()?;
        let matching: Vec<Record> = records
            .iter()
            .filter(|(key, v)| key.kind() == kind && filter.matches(&v.record))
            .map(|(_, v)| v.record.clone())
            .collect();
        Ok(Box::new(matching.into_iter().map(Ok)))
    }

    fn query_keys(&self, kind: Kind) -> Result<Vec<Key>, StoreError> {
        let records = self.read()?;
        Ok(records
            .keys()
            .filter(|key| key.kind() == kind)
            .cloned()
            .collect())
    }
}
