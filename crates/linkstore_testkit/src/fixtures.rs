//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use linkstore_core::{LinkStore, Record, RecordId, StoreConfig};
use linkstore_storage::InMemoryBackend;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A file-backed test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: LinkStore,
    config: StoreConfig,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates a store in a fresh temporary directory.
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Creates a store in a fresh temporary directory, letting the caller
    /// adjust the configuration first.
    pub fn with_config<F>(configure: F) -> Self
    where
        F: FnOnce(StoreConfig) -> StoreConfig,
    {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = configure(StoreConfig::new(temp_dir.path()));
        let store = LinkStore::open(config.clone()).expect("Failed to open test store");

        Self {
            store,
            config,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the store directory.
    pub fn dir(&self) -> &Path {
        &self.config.dir_path
    }

    /// Returns the path of the record log.
    pub fn record_log_path(&self) -> PathBuf {
        self.config.dir_path.join(&self.config.file_name)
    }

    /// Returns the path of the staging log.
    pub fn staging_log_path(&self) -> PathBuf {
        self.config.dir_path.join(&self.config.staging_file_name)
    }

    /// Drops the store and opens it again over the same files, as a
    /// process restart would.
    pub fn reopen(self) -> Self {
        let Self {
            store,
            config,
            _temp_dir,
        } = self;
        drop(store);

        let store = LinkStore::open(config.clone()).expect("Failed to reopen test store");
        Self {
            store,
            config,
            _temp_dir,
        }
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = LinkStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// A store over in-memory backends plus handles to both buffers.
pub struct MemoryStore {
    /// The store instance.
    pub store: LinkStore,
    /// Shared view of the record log bytes.
    pub records: InMemoryBackend,
    /// Shared view of the staging log bytes.
    pub staging: InMemoryBackend,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        let records = InMemoryBackend::new();
        let staging = InMemoryBackend::new();
        let store = LinkStore::open_with_backends(Box::new(records.clone()), Box::new(staging.clone()));

        Self {
            store,
            records,
            staging,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for MemoryStore {
    type Target = LinkStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary file-backed store.
///
/// # Example
///
/// ```rust,ignore
/// use linkstore_testkit::with_temp_store;
///
/// #[test]
/// fn my_test() {
///     with_temp_store(|store| {
///         assert_eq!(store.recover_last_id(), 0);
///     });
/// }
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&LinkStore) -> R,
{
    let test_store = TestStore::new();
    f(&test_store.store)
}

/// Builds a record with `link_count` deterministic links.
pub fn record_with_links(id: RecordId, link_count: usize) -> Record {
    (0..link_count).fold(Record::new(id), |record, i| {
        let status = if i % 3 == 0 { "not available" } else { "available" };
        record.with_link(format!("https://site-{i}.example/check/{id}"), status)
    })
}

/// A small record with two links.
pub fn sample_record(id: RecordId) -> Record {
    record_with_links(id, 2)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store holding records `1..=count`, in order.
    pub fn populated_store(count: i64) -> TestStore {
        let test_store = TestStore::new();
        for id in 1..=count {
            test_store
                .save(&sample_record(id))
                .expect("Failed to save record");
        }
        test_store
    }
}
