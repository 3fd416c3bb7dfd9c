//! Snapshot types for exporting counter values.
//!
//! [`CounterService::totals`](crate::counters::service::CounterService::totals)
//! and [`CounterService::snapshot`](crate::counters::service::CounterService::snapshot)
//! return these types; the [observers](crate::observers) render them.
//!
//! # Feature Flag
//!
//! Serialization requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! shardcount = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use shardcount::snapshot::{CounterSnapshot, MetricsSnapshot};
//!
//! let snapshot = MetricsSnapshot::new(vec![
//!     CounterSnapshot::new("Enqueue", 1000),
//!     CounterSnapshot::new("Error", 5),
//! ]);
//!
//! assert_eq!(snapshot.get("Error").map(|c| c.value), Some(5));
//! assert_eq!(snapshot.total(), 1005);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The value of one counter at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CounterSnapshot {
    /// The name of the counter.
    pub name: String,
    /// The aggregate value of the counter.
    pub value: i64,
}

impl CounterSnapshot {
    /// Creates a new counter snapshot.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A collection of counter snapshots, typically every counter in a store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricsSnapshot {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub timestamp_ms: Option<u64>,
    /// The counter snapshots.
    pub counters: Vec<CounterSnapshot>,
}

impl MetricsSnapshot {
    /// Creates a new metrics snapshot with the given counters.
    pub fn new(counters: Vec<CounterSnapshot>) -> Self {
        Self {
            timestamp_ms: None,
            counters,
        }
    }

    /// Creates a new metrics snapshot with counters and a timestamp.
    pub fn with_timestamp(counters: Vec<CounterSnapshot>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            counters,
        }
    }

    /// Finds a counter by name.
    pub fn get(&self, name: &str) -> Option<&CounterSnapshot> {
        self.counters.iter().find(|c| c.name == name)
    }

    /// Sum of every counter value.
    pub fn total(&self) -> i64 {
        self.counters
            .iter()
            .fold(0i64, |total, c| total.saturating_add(c.value))
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
pub(crate) fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
