//! JSON observer for serializing counter totals.
//!
//! This module provides [`JsonObserver`], which serializes counter
//! snapshots to JSON using serde.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! shardcount = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use shardcount::observers::json::JsonObserver;
//!
//! let totals = counters.totals()?;
//! let json = JsonObserver::new().to_json(&totals)?;
//!
//! println!("{}", json);
//! // [{"name":"Enqueue","value":1000},{"name":"Error","value":5}]
//! ```

use crate::observers::Result;
use crate::snapshot::{current_timestamp_ms, CounterSnapshot, MetricsSnapshot};

/// Configuration for the JSON observer.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Whether to pretty-print the JSON output.
    pub pretty: bool,
    /// Whether to include a timestamp in the output.
    pub include_timestamp: bool,
    /// Whether to wrap counters in a MetricsSnapshot object.
    pub wrap_in_snapshot: bool,
}

/// An observer that serializes counter snapshots to JSON.
///
/// # Examples
///
/// ```rust
/// use shardcount::observers::json::JsonObserver;
/// use shardcount::snapshot::CounterSnapshot;
///
/// let totals = vec![CounterSnapshot::new("requests", 42)];
/// let json = JsonObserver::new().to_json(&totals).unwrap();
///
/// assert_eq!(json, r#"[{"name":"requests","value":42}]"#);
/// ```
///
/// With timestamp wrapper:
///
/// ```rust
/// use shardcount::observers::json::JsonObserver;
///
/// let observer = JsonObserver::new()
///     .wrap_in_snapshot(true)
///     .include_timestamp(true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new JSON observer with the specified configuration.
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Enables or disables timestamp inclusion.
    ///
    /// Only has effect when `wrap_in_snapshot` is also enabled.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.config.include_timestamp = enabled;
        self
    }

    /// Enables or disables wrapping the output in a [`MetricsSnapshot`].
    pub fn wrap_in_snapshot(mut self, enabled: bool) -> Self {
        self.config.wrap_in_snapshot = enabled;
        self
    }

    /// Serializes counters to a JSON string.
    pub fn to_json(&self, counters: &[CounterSnapshot]) -> Result<String> {
        let bytes = self.to_json_bytes(counters)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Serializes counters to a JSON byte vector.
    pub fn to_json_bytes(&self, counters: &[CounterSnapshot]) -> Result<Vec<u8>> {
        let bytes = if self.config.wrap_in_snapshot {
            let snapshot = if self.config.include_timestamp {
                MetricsSnapshot::with_timestamp(counters.to_vec(), current_timestamp_ms())
            } else {
                MetricsSnapshot::new(counters.to_vec())
            };
            self.encode(&snapshot)?
        } else {
            self.encode(counters)?
        };
        Ok(bytes)
    }

    /// Serializes a complete [`MetricsSnapshot`], keeping its own timestamp.
    pub fn snapshot_to_json(&self, snapshot: &MetricsSnapshot) -> Result<String> {
        Ok(String::from_utf8(self.encode(snapshot)?)?)
    }

    fn encode<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let bytes = if self.config.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(bytes)
    }
}
