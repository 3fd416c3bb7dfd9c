//! Shard configuration records.
//!
//! [`ConfigStore`] owns the [`CounterConfig`] records: it creates them on
//! first use, raises their shard count and enumerates counter names. Every
//! mutation runs inside a store transaction, so concurrent bootstraps of the
//! same counter converge on a single record.

use crate::adapters::{Key, Kind, Record, Store, Transaction};
use crate::counters::CounterConfig;
use crate::error::{CounterError, Result};

/// Access to the [`CounterConfig`] records of a store.
#[derive(Debug)]
pub struct ConfigStore<'a, S> {
    store: &'a S,
    default_shards: usize,
}

impl<'a, S: Store> ConfigStore<'a, S> {
    /// Creates a view over `store` that bootstraps counters with
    /// `default_shards` shards (at least 1).
    pub fn new(store: &'a S, default_shards: usize) -> Self {
        Self {
            store,
            default_shards: default_shards.max(1),
        }
    }

    /// Reads the config of `name`, `None` if the counter was never written.
    pub fn get(&self, name: &str) -> Result<Option<CounterConfig>> {
        let key = Key::config(name);
        self.store.run_in_transaction(|tx| load(tx, &key))
    }

    /// Reads the config of `name`, creating it with the default shard count
    /// if absent.
    ///
    /// Racing callers all observe the same record: the loser's transaction
    /// conflicts, is retried and then finds the winner's write.
    pub fn get_or_create(&self, name: &str) -> Result<CounterConfig> {
        let key = Key::config(name);
        self.store.run_in_transaction(|tx| match load(tx, &key)? {
            Some(config) => Ok(config),
            None => {
                let config = CounterConfig::new(name, self.default_shards);
                tx.put(key.clone(), Record::Config(config.clone()))?;
                Ok(config)
            }
        })
    }

    /// Raises the shard count of `name` to at least `shards`.
    ///
    /// Creates the config with the default shard count first if absent. The
    /// shard count is never lowered. Returns the resulting config and
    /// whether anything was written.
    pub fn raise_to(&self, name: &str, shards: usize) -> Result<(CounterConfig, bool)> {
        let key = Key::config(name);
        self.store.run_in_transaction(|tx| {
            let (mut config, mut modified) = match load(tx, &key)? {
                Some(config) => (config, false),
                None => (CounterConfig::new(name, self.default_shards), true),
            };
            if config.shards < shards {
                config.shards = shards;
                modified = true;
            }
            if modified {
                tx.put(key.clone(), Record::Config(config.clone()))?;
            }
            Ok((config, modified))
        })
    }

    /// Names of every counter that has a config record.
    pub fn names(&self) -> Result<Vec<String>> {
        let keys = self.store.query_keys(Kind::Config)?;
        Ok(keys.into_iter().map(|key| key.name().to_string()).collect())
    }
}

fn load(tx: &mut dyn Transaction, key: &Key) -> Result<Option<CounterConfig>> {
    match tx.get(key)? {
        None => Ok(None),
        Some(Record::Config(config)) if config.shards == 0 => Err(CounterError::CorruptedRecord {
            key: key.to_string(),
            reason: "config has zero shards".to_string(),
        }),
        Some(Record::Config(config)) => Ok(Some(config)),
        Some(other) => Err(CounterError::CorruptedRecord {
            key: key.to_string(),
            reason: format!("expected a config record, found {}", other.kind().as_str()),
        }),
    }
}
