//! Storage backend trait definition.

use crate::error::StorageResult;
use std::io::{Read, Seek};

/// A readable, seekable view over a backend's bytes.
///
/// Blanket-implemented for every `Read + Seek` type, so both
/// [`std::fs::File`] and [`std::io::Cursor`] qualify.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// A low-level storage backend for LinkStore.
///
/// Storage backends are **opaque byte stores**. They append bytes, hand out
/// readers and can be truncated to empty. LinkStore owns the line format;
/// backends do not know what a record is.
///
/// # Invariants
///
/// - `append` writes the whole buffer in one call or fails
/// - a reader returned by `reader` observes every byte appended before it
///   was created
/// - `truncate` leaves the backend empty
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Appends data to the end of the storage.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Opens a reader positioned at the start of the storage.
    ///
    /// The reader owns its handle; dropping it releases the handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be opened for reading.
    fn reader(&self) -> StorageResult<Box<dyn ReadSeek>>;

    /// Returns the current size of the storage in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Truncates the storage to zero length.
    ///
    /// # Errors
    ///
    /// Returns an error if the truncation fails.
    fn truncate(&mut self) -> StorageResult<()>;

    /// Human-readable location of the storage, used in log output.
    fn location(&self) -> String;
}
