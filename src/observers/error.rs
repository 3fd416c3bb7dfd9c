//! Unified error type for all observers.
//!
//! Every observer returns [`ObserverError`], so client code can switch
//! renderers without changing its error handling.

use thiserror::Error;

/// Unified error type for all observer operations.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// Error from the JSON observer.
    #[cfg(feature = "json")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error encoding to UTF-8.
    #[error("utf8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Error reading the counters to render.
    #[error("counter error: {0}")]
    Counter(#[from] crate::error::CounterError),
}

/// Result type for observer operations.
pub type Result<T> = std::result::Result<T, ObserverError>;
