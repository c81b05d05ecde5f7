//! In-memory storage backend for testing.

use crate::backend::{ReadSeek, StorageBackend};
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::io::Cursor;
use std::sync::Arc;

/// An in-memory storage backend.
///
/// This backend stores all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// Clones share the same buffer, so a test can hand one clone to a store
/// and keep another to inspect or corrupt the bytes.
///
/// # Example
///
/// ```rust
/// use linkstore_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.append(b"test data").unwrap();
/// assert_eq!(backend.size().unwrap(), 9);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    data: Arc<RwLock<Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Returns a copy of all data in the backend.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Appends raw bytes without going through the trait.
    ///
    /// Lets tests simulate a torn write from outside the store.
    pub fn inject(&self, bytes: &[u8]) {
        self.data.write().extend_from_slice(bytes);
    }
}

impl StorageBackend for InMemoryBackend {
    fn append(&mut self, new_data: &[u8]) -> StorageResult<()> {
        self.data.write().extend_from_slice(new_data);
        Ok(())
    }

    fn reader(&self) -> StorageResult<Box<dyn ReadSeek>> {
        Ok(Box::new(Cursor::new(self.data.read().clone())))
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn truncate(&mut self) -> StorageResult<()> {
        self.data.write().clear();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
