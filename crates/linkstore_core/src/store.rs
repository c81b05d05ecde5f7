//! The persistence facade.
//!
//! [`LinkStore`] owns both logs inside a single mutex. Every operation,
//! read or write, takes that mutex for its whole duration, so no two
//! filesystem operations on either file ever overlap and each call sees
//! the pair of files in a consistent state. Readers wait for writers and
//! for each other.
//!
//! ## Start-up
//!
//! ```rust,ignore
//! let store = LinkStore::open(config)?;
//! let state = store.recover()?;
//! for record in &state.staged {
//!     // re-drive the interrupted work, then:
//! }
//! store.promote(&state.staged)?;
//! let mut next_id = state.next_id();
//! ```

use crate::config::StoreConfig;
use crate::dir::StoreDir;
use crate::error::{CoreError, CoreResult};
use crate::record::{Record, RecordId};
use crate::record_log::RecordLog;
use crate::staging::StagingLog;
use crate::stats::StoreStats;
use linkstore_storage::{StorageBackend, DEFAULT_CHUNK_SIZE};
use parking_lot::Mutex;
use tracing::{info, warn};

/// Both logs, reachable only through the store lock.
struct Logs {
    records: RecordLog,
    staging: StagingLog,
}

/// What a caller needs to resume after a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryState {
    /// Records staged by a sequence that never reached `clear_staged`.
    pub staged: Vec<Record>,
    /// ID of the last record in the record log, 0 if none could be read.
    pub last_id: RecordId,
}

impl RecoveryState {
    /// Returns true if nothing was left staged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
    }

    /// First ID that is above both the committed and the staged IDs.
    #[must_use]
    pub fn next_id(&self) -> RecordId {
        self.staged
            .iter()
            .map(|record| record.id)
            .fold(self.last_id, RecordId::max)
            .saturating_add(1)
    }
}

/// File-backed store of link-check records.
///
/// # Thread Safety
///
/// `LinkStore` is `Send + Sync`; share it with `Arc`. All operations are
/// serialized by one internal lock.
///
/// # Example
///
/// ```rust,ignore
/// use linkstore_core::{LinkStore, Record, StoreConfig};
///
/// let store = LinkStore::open(StoreConfig::new("data"))?;
/// store.save(&Record::new(1).with_link("http://a", "available"))?;
/// assert_eq!(store.get(1)?.links["http://a"], "available");
/// assert_eq!(store.recover_last_id(), 1);
/// ```
pub struct LinkStore {
    logs: Mutex<Logs>,
    /// Held for its directory lock; `None` for custom backends.
    _dir: Option<StoreDir>,
}

impl LinkStore {
    /// Opens the store described by `config`, creating the directory and
    /// both log files if they are missing.
    ///
    /// A record log whose final line was cut short gets a newline appended,
    /// so later saves start on a fresh line.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidConfig`] if the configuration is
    /// invalid or the directory or files cannot be created, and
    /// [`crate::CoreError::StoreLocked`] if another process holds the store.
    pub fn open(config: StoreConfig) -> CoreResult<Self> {
        config.validate()?;

        let dir = StoreDir::open(&config.dir_path, config.create_if_missing, config.lock_dir)?;
        let (records, staging) = dir.create_logs(&config)?;

        info!(
            file = %records.path().display(),
            temp_path = %staging.path().display(),
            "link store opened"
        );

        let mut records = RecordLog::new(Box::new(records), config.tail_chunk_size);
        seal_record_log(&mut records)?;

        let logs = Logs {
            records,
            staging: StagingLog::new(Box::new(staging)),
        };

        Ok(Self {
            logs: Mutex::new(logs),
            _dir: Some(dir),
        })
    }

    /// Creates a store over caller-supplied backends.
    ///
    /// Used for tests and for embedding the store over non-file storage.
    pub fn open_with_backends(
        record_backend: Box<dyn StorageBackend>,
        staging_backend: Box<dyn StorageBackend>,
    ) -> Self {
        Self::open_with_backends_and_chunk(record_backend, staging_backend, DEFAULT_CHUNK_SIZE)
    }

    /// Like [`LinkStore::open_with_backends`] with an explicit tail scan chunk size.
    pub fn open_with_backends_and_chunk(
        record_backend: Box<dyn StorageBackend>,
        staging_backend: Box<dyn StorageBackend>,
        tail_chunk_size: usize,
    ) -> Self {
        let logs = Logs {
            records: RecordLog::new(record_backend, tail_chunk_size),
            staging: StagingLog::new(staging_backend),
        };

        Self {
            logs: Mutex::new(logs),
            _dir: None,
        }
    }

    /// Appends a committed record to the record log.
    ///
    /// # Errors
    ///
    /// Returns a serialization or storage error; nothing is retried.
    pub fn save(&self, record: &Record) -> CoreResult<()> {
        self.logs.lock().records.save(record)
    }

    /// Appends a record to the staging log.
    ///
    /// # Errors
    ///
    /// Returns a serialization or storage error; nothing is retried.
    pub fn stage(&self, record: &Record) -> CoreResult<()> {
        self.logs.lock().staging.stage(record)
    }

    /// Returns every staged record in the order it was staged.
    ///
    /// # Errors
    ///
    /// Returns an error if the staging log cannot be read or any non-blank
    /// line fails to decode.
    pub fn load_staged(&self) -> CoreResult<Vec<Record>> {
        self.logs.lock().staging.load()
    }

    /// Truncates the staging log.
    ///
    /// The caller must have saved every record from the latest
    /// [`LinkStore::load_staged`] first; this is not checked.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the truncation fails.
    pub fn clear_staged(&self) -> CoreResult<()> {
        self.logs.lock().staging.clear()
    }

    /// Looks up the first record with `id` by scanning the record log.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::RecordNotFound`] if no record matches,
    /// or an I/O error if the log cannot be read.
    pub fn get(&self, id: RecordId) -> CoreResult<Record> {
        self.logs.lock().records.get(id)
    }

    /// Looks up several IDs, skipping those that do not exist.
    ///
    /// Each ID is a separate locked lookup, so writers may interleave
    /// between them. Results keep the order of `ids`.
    ///
    /// # Errors
    ///
    /// Returns the first error other than not-found.
    pub fn get_many(&self, ids: &[RecordId]) -> CoreResult<Vec<Record>> {
        let mut found = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.get(id) {
                Ok(record) => found.push(record),
                Err(err) if err.is_not_found() => warn!(id, "record not found, skipping"),
                Err(err) => return Err(err),
            }
        }
        Ok(found)
    }

    /// Returns the ID of the last committed record, or 0.
    ///
    /// 0 means the log is empty *or* its tail could not be read or decoded;
    /// the two cases are indistinguishable here.
    pub fn recover_last_id(&self) -> RecordId {
        self.logs.lock().records.last_id()
    }

    /// Like [`LinkStore::recover_last_id`] but reports why no ID was found.
    ///
    /// # Errors
    ///
    /// Returns the stat, read or decode error hidden by `recover_last_id`.
    pub fn try_recover_last_id(&self) -> CoreResult<Option<RecordId>> {
        self.logs.lock().records.try_last_id()
    }

    /// Loads leftover staged records and the last committed ID in one
    /// locked step.
    ///
    /// # Errors
    ///
    /// Returns an error if the staging log cannot be loaded.
    pub fn recover(&self) -> CoreResult<RecoveryState> {
        let logs = self.logs.lock();
        let staged = logs.staging.load()?;
        let last_id = logs.records.last_id();

        if !staged.is_empty() {
            warn!(
                staged = staged.len(),
                last_id, "found records from an interrupted commit sequence"
            );
        }

        Ok(RecoveryState { staged, last_id })
    }

    /// Saves `records` in order and then clears the staging log, all under
    /// one lock acquisition.
    ///
    /// If a save fails, the staging log is left untouched and the error is
    /// returned. Records saved before the failure stay in the record log,
    /// so re-driving the batch can commit them a second time.
    ///
    /// # Errors
    ///
    /// Returns the first save error, or the truncation error.
    pub fn promote(&self, records: &[Record]) -> CoreResult<()> {
        let mut logs = self.logs.lock();
        for (committed, record) in records.iter().enumerate() {
            if let Err(err) = logs.records.save(record) {
                warn!(
                    committed,
                    remaining = records.len() - committed,
                    "promotion interrupted, staging log kept"
                );
                return Err(err);
            }
        }
        logs.staging.clear()
    }

    /// Summarizes both logs.
    ///
    /// Reads every line of both files while holding the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if either log cannot be read.
    pub fn stats(&self) -> CoreResult<StoreStats> {
        let logs = self.logs.lock();
        Ok(StoreStats {
            record_log: logs.records.summary()?,
            staging_log: logs.staging.summary()?,
            last_id: logs.records.last_id(),
        })
    }
}

/// Terminates a torn final line before the store accepts writes.
fn seal_record_log(records: &mut RecordLog) -> CoreResult<()> {
    records.seal_torn_tail().map(drop).map_err(|err| {
        CoreError::invalid_config(format!(
            "failed to repair record log {}: {err}",
            records.location()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkstore_storage::{InMemoryBackend, ReadSeek, StorageError, StorageResult};
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    fn memory_store() -> (LinkStore, InMemoryBackend, InMemoryBackend) {
        let records = InMemoryBackend::new();
        let staging = InMemoryBackend::new();
        let store = LinkStore::open_with_backends_and_chunk(
            Box::new(records.clone()),
            Box::new(staging.clone()),
            16,
        );
        (store, records, staging)
    }

    #[test]
    fn end_to_end_on_disk() {
        let temp = tempdir().unwrap();
        let store = LinkStore::open(StoreConfig::new(temp.path().join("store"))).unwrap();

        assert_eq!(store.recover_last_id(), 0);

        let first = Record::new(1).with_link("http://a", "ok");
        store.save(&first).unwrap();
        assert_eq!(store.get(1).unwrap(), first);
        assert_eq!(store.recover_last_id(), 1);

        store.stage(&Record::new(2)).unwrap();
        assert_eq!(store.load_staged().unwrap(), vec![Record::new(2)]);

        store.clear_staged().unwrap();
        assert!(store.load_staged().unwrap().is_empty());
    }

    #[test]
    fn open_rejects_invalid_config() {
        let temp = tempdir().unwrap();
        let config = StoreConfig::new(temp.path()).file_name("");

        assert!(matches!(LinkStore::open(config), Err(CoreError::InvalidConfig { .. })));
    }

    #[test]
    fn open_fails_when_dir_cannot_be_created() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let result = LinkStore::open(StoreConfig::new(blocker.join("store")));
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    }

    #[test]
    fn second_open_of_same_dir_is_locked() {
        let temp = tempdir().unwrap();
        let _store = LinkStore::open(StoreConfig::new(temp.path())).unwrap();

        let result = LinkStore::open(StoreConfig::new(temp.path()));
        assert!(matches!(result, Err(CoreError::StoreLocked)));
    }

    #[test]
    fn reopen_resumes_last_id_and_staging() {
        let temp = tempdir().unwrap();

        {
            let store = LinkStore::open(StoreConfig::new(temp.path())).unwrap();
            store.save(&Record::new(1)).unwrap();
            store.save(&Record::new(2)).unwrap();
            store.stage(&Record::new(3).with_link("http://c", "pending")).unwrap();
        }

        let store = LinkStore::open(StoreConfig::new(temp.path())).unwrap();
        let state = store.recover().unwrap();

        assert_eq!(state.last_id, 2);
        assert_eq!(state.staged, vec![Record::new(3).with_link("http://c", "pending")]);
        assert!(!state.is_clean());
        assert_eq!(state.next_id(), 4);
    }

    #[test]
    fn reopen_after_torn_append_keeps_later_saves_readable() {
        let temp = tempdir().unwrap();

        {
            let store = LinkStore::open(StoreConfig::new(temp.path())).unwrap();
            store.save(&Record::new(1)).unwrap();
        }
        let path = temp.path().join("links.jsonl");
        let mut data = std::fs::read(&path).unwrap();
        data.extend_from_slice(b"{\"id\":2,\"lin");
        std::fs::write(&path, data).unwrap();

        let store = LinkStore::open(StoreConfig::new(temp.path())).unwrap();
        assert_eq!(store.recover_last_id(), 0);

        store.save(&Record::new(3)).unwrap();
        assert_eq!(store.get(1).unwrap(), Record::new(1));
        assert_eq!(store.get(3).unwrap(), Record::new(3));
        assert_eq!(store.recover_last_id(), 3);
    }

    /// Reports a non-empty log whose reads always fail.
    struct UnreadableBackend;

    impl StorageBackend for UnreadableBackend {
        fn append(&mut self, _data: &[u8]) -> StorageResult<()> {
            Ok(())
        }

        fn reader(&self) -> StorageResult<Box<dyn ReadSeek>> {
            Err(StorageError::Io(std::io::Error::other("read denied")))
        }

        fn size(&self) -> StorageResult<u64> {
            Ok(10)
        }

        fn truncate(&mut self) -> StorageResult<()> {
            Ok(())
        }

        fn location(&self) -> String {
            "unreadable".to_string()
        }
    }

    #[test]
    fn failed_tail_repair_is_a_config_error() {
        let mut records = RecordLog::new(Box::new(UnreadableBackend), 16);

        let err = seal_record_log(&mut records).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
        assert!(err.to_string().contains("unreadable"));
    }

    #[test]
    fn open_rejects_unusable_lock_file() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("LOCK")).unwrap();

        let result = LinkStore::open(StoreConfig::new(temp.path()));
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    }

    #[test]
    fn next_id_without_staged_records() {
        let state = RecoveryState {
            staged: Vec::new(),
            last_id: 41,
        };
        assert!(state.is_clean());
        assert_eq!(state.next_id(), 42);
        assert_eq!(RecoveryState::default().next_id(), 1);
    }

    #[test]
    fn get_many_skips_missing_ids() {
        let (store, _, _) = memory_store();
        store.save(&Record::new(1)).unwrap();
        store.save(&Record::new(3)).unwrap();

        let found: Vec<_> = store.get_many(&[3, 2, 1]).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(found, vec![3, 1]);
    }

    #[test]
    fn promote_commits_and_clears() {
        let (store, records, staging) = memory_store();
        let batch = vec![Record::new(1), Record::new(2).with_link("http://b", "ok")];
        for record in &batch {
            store.stage(record).unwrap();
        }

        store.promote(&store.load_staged().unwrap()).unwrap();

        assert!(staging.data().is_empty());
        assert_eq!(store.get(2).unwrap(), batch[1]);
        assert_eq!(store.recover_last_id(), 2);
        assert_eq!(records.data().iter().filter(|&&b| b == b'\n').count(), 2);
    }

    #[test]
    fn try_recover_distinguishes_empty_from_unreadable() {
        let (store, records, _) = memory_store();
        assert_eq!(store.try_recover_last_id().unwrap(), None);

        records.inject(b"{\"id\":");
        assert_eq!(store.recover_last_id(), 0);
        assert!(store.try_recover_last_id().is_err());
    }

    #[test]
    fn stats_cover_both_logs() {
        let (store, records, _) = memory_store();
        store.save(&Record::new(1)).unwrap();
        records.inject(b"oops\n");
        store.save(&Record::new(2)).unwrap();
        store.stage(&Record::new(3)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.record_log.records, 2);
        assert_eq!(stats.record_log.unreadable_lines, vec![2]);
        assert_eq!(stats.staging_log.records, 1);
        assert_eq!(stats.last_id, 2);
    }

    #[test]
    fn concurrent_saves_do_not_interleave() {
        let (store, records, _) = memory_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        let id = t * 1000 + i;
                        let record = Record::new(id).with_link(format!("http://host/{id}"), "ok");
                        store.save(&record).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let data = records.data();
        let mut ids: Vec<RecordId> = data
            .split(|&b| b == b'\n')
            .filter(|line| !line.is_empty())
            .map(|line| Record::decode(line).unwrap().id)
            .collect();
        ids.sort_unstable();

        let mut expected: Vec<RecordId> =
            (0..8).flat_map(|t| (0..50).map(move |i| t * 1000 + i)).collect();
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }
}
