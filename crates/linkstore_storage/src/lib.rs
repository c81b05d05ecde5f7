//! # LinkStore Storage
//!
//! Storage backend trait and implementations for LinkStore.
//!
//! This crate provides the lowest-level storage abstraction for LinkStore.
//! Storage backends are **opaque byte stores** - they do not interpret
//! the lines they store.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (append, read, truncate)
//! - No knowledge of the record format
//! - File handles are scoped to a single call, so external tooling may
//!   inspect or rotate a file between calls
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Tail Scanning
//!
//! [`read_last_line`] extracts the final line of any seekable reader using
//! fixed-size chunk reads from the end, so its cost is proportional to the
//! length of that line and not to the size of the file.
//!
//! ## Example
//!
//! ```rust
//! use linkstore_storage::{read_last_line, InMemoryBackend, StorageBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.append(b"first\nsecond\n").unwrap();
//!
//! let mut reader = backend.reader().unwrap();
//! let last = read_last_line(&mut *reader, 4).unwrap();
//! assert_eq!(last.as_deref(), Some(&b"second"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod tail;

pub use backend::{ReadSeek, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
pub use tail::{read_last_line, DEFAULT_CHUNK_SIZE};
