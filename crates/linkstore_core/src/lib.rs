//! # LinkStore Core
//!
//! Persistence layer for link-check results.
//!
//! This crate provides:
//! - [`Record`] - an identifier plus a map of checked URLs to their status
//! - [`RecordLog`] - the append-only history of committed records
//! - [`StagingLog`] - a transient buffer that makes commit sequences resumable
//! - [`LinkStore`] - the facade that serializes every operation behind one lock
//! - [`LinkRepository`] - the persistence contract consumed by service code
//!
//! ## Commit protocol
//!
//! ```rust,ignore
//! use linkstore_core::{LinkStore, Record, StoreConfig};
//!
//! let store = LinkStore::open(StoreConfig::new("data"))?;
//!
//! let state = store.recover()?;
//! // re-drive state.staged here, then continue from state.next_id()
//!
//! let record = Record::new(state.next_id()).with_link("https://example.com", "available");
//! store.stage(&record)?;
//! // ... perform the checks the record describes ...
//! store.save(&record)?;
//! store.clear_staged()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dir;
mod error;
mod lines;
mod record;
mod record_log;
mod repository;
mod staging;
mod stats;
mod store;

pub use config::{StoreConfig, ENV_DIR_PATH, ENV_FILE_NAME, ENV_TEMP_FILE_NAME};
pub use dir::StoreDir;
pub use error::{CoreError, CoreResult};
pub use record::{Record, RecordId};
pub use record_log::RecordLog;
pub use repository::LinkRepository;
pub use staging::StagingLog;
pub use stats::{LogSummary, StoreStats};
pub use store::{LinkStore, RecoveryState};

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
