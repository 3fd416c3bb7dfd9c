//! Shard records.
//!
//! [`ShardStore`] reads and updates the [`CounterShard`] records of a
//! store. A missing shard is never an error: it simply has not been
//! selected by any increment yet and counts as zero.

use crate::adapters::{Filter, Key, Kind, Record, Store, Transaction};
use crate::counters::CounterShard;
use crate::error::{CounterError, Result};

/// Access to the [`CounterShard`] records of a store.
#[derive(Debug)]
pub struct ShardStore<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> ShardStore<'a, S> {
    /// Creates a view over `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Adds `by` to shard `index` of `name` and returns the shard's new
    /// count. The shard is created at zero if absent.
    pub fn add(&self, name: &str, index: usize, by: i64) -> Result<i64> {
        let key = Key::shard(name, index);
        self.store.run_in_transaction(|tx| {
            let mut shard = load(tx, &key)?.unwrap_or_else(|| CounterShard::new(name, index));
            shard.count = shard.count.saturating_add(by);
            let count = shard.count;
            tx.put(key.clone(), Record::Shard(shard))?;
            Ok(count)
        })
    }

    /// Every stored shard of `name`, in unspecified order.
    pub fn shards(&self, name: &str) -> Result<Vec<CounterShard>> {
        let records = self
            .store
            .query(Kind::Shard, &Filter::NameEq(name.to_string()))?;

        let mut shards = Vec::new();
        for record in records {
            match record? {
                Record::Shard(shard) => shards.push(shard),
                other => {
                    return Err(CounterError::CorruptedRecord {
                        key: Key::config(other.counter_name()).to_string(),
                        reason: "config record returned by a shard query".to_string(),
                    })
                }
            }
        }
        Ok(shards)
    }

    /// Sum of every stored shard of `name`; zero if none exist.
    ///
    /// Shards are read one by one without a common snapshot, so increments
    /// racing the scan may or may not be included.
    pub fn sum(&self, name: &str) -> Result<i64> {
        Ok(self
            .shards(name)?
            .iter()
            .fold(0i64, |total, shard| total.saturating_add(shard.count)))
    }
}

fn load(tx: &mut dyn Transaction, key: &Key) -> Result<Option<CounterShard>> {
    match tx.get(key)? {
        None => Ok(None),
        Some(Record::Shard(shard)) => Ok(Some(shard)),
        Some(other) => Err(CounterError::CorruptedRecord {
            key: key.to_string(),
            reason: format!("expected a shard record, found {}", other.kind().as_str()),
        }),
    }
}
