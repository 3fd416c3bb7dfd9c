//! Observer implementations for exporting counter totals.
//!
//! This module renders the output of
//! [`CounterService::totals`](crate::counters::service::CounterService::totals):
//!
//! - [`table`] - Pretty-print totals as tables using the `tabled` crate
//! - [`json`] - Serialize totals to JSON format
//!
//! # Unified Error Handling
//!
//! All observers use a unified [`ObserverError`] type, allowing you to switch
//! between observers without changing error handling code.
//!
//! # Feature Flags
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module
//! - `full` - Enables all observer modules
//!
//! # Example
//!
//! ```rust,ignore
//! use shardcount::observers::Result;
//!
//! fn export(counters: &CounterService<MemoryStore, MemoryCache>) -> Result<()> {
//!     let totals = counters.totals()?;
//!
//!     #[cfg(feature = "table")]
//!     {
//!         use shardcount::observers::table::TableObserver;
//!         println!("{}", TableObserver::new().render(&totals));
//!     }
//!
//!     #[cfg(feature = "json")]
//!     {
//!         use shardcount::observers::json::JsonObserver;
//!         println!("{}", JsonObserver::new().pretty(true).to_json(&totals)?);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod error;

pub use error::{ObserverError, Result};

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;
