//! Error type returned by counter operations.
//!
//! Only failures that affect correctness reach the caller: store errors and
//! records the store hands back in an unexpected shape. Cache failures are
//! absorbed by [`CounterService`](crate::counters::service::CounterService)
//! and never show up here.

use thiserror::Error;

use crate::adapters::StoreError;

/// Errors surfaced by [`CounterService`](crate::counters::service::CounterService).
#[derive(Debug, Error)]
pub enum CounterError {
    /// The persistent store failed, after its own retry policy was exhausted.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The store returned a record that cannot belong under `key`.
    #[error("corrupted record at {key}: {reason}")]
    CorruptedRecord {
        /// Display form of the offending key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A day-suffixed counter name could not be formatted.
    #[error("date format error: {0}")]
    Format(#[from] time::error::Format),
}

/// Result type for counter operations.
pub type Result<T> = std::result::Result<T, CounterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts() {
        let err: CounterError = StoreError::Conflict { attempts: 3 }.into();
        assert!(matches!(err, CounterError::Store(StoreError::Conflict { attempts: 3 })));
        assert_eq!(
            err.to_string(),
            "store error: transaction conflict after 3 attempts"
        );
    }

    #[test]
    fn test_corrupted_record_display() {
        let err = CounterError::CorruptedRecord {
            key: "Config/hits".to_string(),
            reason: "zero shards".to_string(),
        };
        assert_eq!(err.to_string(), "corrupted record at Config/hits: zero shards");
    }
}
