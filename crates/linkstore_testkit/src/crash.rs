//! Crash simulation for the stage / save / clear protocol.
//!
//! A commit sequence touches two files in three steps. A crash can leave
//! the pair in any of the intermediate states below; recovery must see
//! each of them correctly after a restart.
//!
//! ## Test Strategy
//!
//! 1. **Crash after stage** - the batch is staged, nothing is committed
//! 2. **Crash mid-promotion** - some of the batch is committed, all of it is staged
//! 3. **Crash before clear** - the whole batch is committed and still staged
//! 4. **Torn append** - the record log ends in a partial line
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linkstore_testkit::crash::{run_until_crash, CrashPoint};
//! use linkstore_testkit::fixtures::TestStore;
//!
//! let store = TestStore::new();
//! run_until_crash(&store, &batch, CrashPoint::BeforeClear);
//! let store = store.reopen();
//! let state = store.recover().unwrap();
//! ```

use crate::fixtures::TestStore;
use linkstore_core::{LinkStore, Record};
use linkstore_storage::{ReadSeek, StorageBackend, StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Points at which a commit sequence can be interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashPoint {
    /// Every record staged, none saved.
    AfterStage,
    /// Every record staged, the first `committed` saved.
    MidPromotion {
        /// Records saved before the crash.
        committed: usize,
    },
    /// Every record staged and saved, staging not cleared.
    BeforeClear,
    /// The sequence completed.
    Completed,
}

/// Drives the commit protocol for `batch` up to `point`, then stops as if
/// the process had died.
///
/// # Panics
///
/// Panics if any store operation fails.
pub fn run_until_crash(store: &LinkStore, batch: &[Record], point: CrashPoint) {
    for record in batch {
        store.stage(record).expect("Failed to stage record");
    }

    let committed = match point {
        CrashPoint::AfterStage => 0,
        CrashPoint::MidPromotion { committed } => committed.min(batch.len()),
        CrashPoint::BeforeClear | CrashPoint::Completed => batch.len(),
    };

    for record in &batch[..committed] {
        store.save(record).expect("Failed to save record");
    }

    if point == CrashPoint::Completed {
        store.clear_staged().expect("Failed to clear staging log");
    }
}

/// Appends the first `keep` bytes of `record`'s encoded line to the file at
/// `path`, without a terminator, as a write cut short by a crash would.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn append_torn_line(path: &Path, record: &Record, keep: usize) {
    let line = record.encode_line().expect("Failed to encode record");
    let keep = keep.min(line.len().saturating_sub(1));

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .expect("Failed to open log for torn write");
    file.write_all(&line[..keep])
        .expect("Failed to write torn line");
}

/// Simulates a crash in `store`'s record log after `batch` has been staged
/// and partly saved, ending with a torn line for the next record.
pub fn torn_promotion(store: &TestStore, batch: &[Record], committed: usize) {
    run_until_crash(store, batch, CrashPoint::MidPromotion { committed });
    if let Some(next) = batch.get(committed) {
        append_torn_line(&store.record_log_path(), next, 7);
    }
}

/// A storage backend wrapper that fails on demand.
///
/// Appends start failing once `fail_after_appends` successful appends have
/// happened. Clones share their state, so a test can keep a handle while
/// the store owns the backend.
#[derive(Clone)]
pub struct FailingBackend {
    state: Arc<FailureState>,
}

struct FailureState {
    backend: Mutex<Box<dyn StorageBackend>>,
    fail_after_appends: AtomicUsize,
    appends: AtomicUsize,
    fail_reads: AtomicBool,
    fail_truncate: AtomicBool,
}

fn simulated(what: &str) -> StorageError {
    StorageError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("simulated failure during {what}"),
    ))
}

impl FailingBackend {
    /// Wraps `inner`; no failures are armed.
    pub fn new(inner: Box<dyn StorageBackend>) -> Self {
        Self {
            state: Arc::new(FailureState {
                backend: Mutex::new(inner),
                fail_after_appends: AtomicUsize::new(usize::MAX),
                appends: AtomicUsize::new(0),
                fail_reads: AtomicBool::new(false),
                fail_truncate: AtomicBool::new(false),
            }),
        }
    }

    /// Lets `count` more appends succeed, then fails every later one.
    pub fn fail_appends_after(&self, count: usize) {
        let done = self.state.appends.load(Ordering::SeqCst);
        self.state
            .fail_after_appends
            .store(done.saturating_add(count), Ordering::SeqCst);
    }

    /// Sets whether readers and size queries fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Sets whether truncation fails.
    pub fn set_fail_truncate(&self, fail: bool) {
        self.state.fail_truncate.store(fail, Ordering::SeqCst);
    }

    /// Disarms every failure.
    pub fn reset(&self) {
        self.state.fail_after_appends.store(usize::MAX, Ordering::SeqCst);
        self.set_fail_reads(false);
        self.set_fail_truncate(false);
    }

    /// Number of appends that reached the inner backend.
    pub fn appends(&self) -> usize {
        self.state.appends.load(Ordering::SeqCst)
    }
}

impl StorageBackend for FailingBackend {
    fn append(&mut self, data: &[u8]) -> StorageResult<()> {
        if self.appends() >= self.state.fail_after_appends.load(Ordering::SeqCst) {
            return Err(simulated("append"));
        }
        self.state.backend.lock().append(data)?;
        self.state.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn reader(&self) -> StorageResult<Box<dyn ReadSeek>> {
        if self.state.fail_reads.load(Ordering::SeqCst) {
            return Err(simulated("read"));
        }
        self.state.backend.lock().reader()
    }

    fn size(&self) -> StorageResult<u64> {
        if self.state.fail_reads.load(Ordering::SeqCst) {
            return Err(simulated("stat"));
        }
        self.state.backend.lock().size()
    }

    fn truncate(&mut self) -> StorageResult<()> {
        if self.state.fail_truncate.load(Ordering::SeqCst) {
            return Err(simulated("truncate"));
        }
        self.state.backend.lock().truncate()
    }

    fn location(&self) -> String {
        format!("failing({})", self.state.backend.lock().location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record_with_links, MemoryStore};
    use linkstore_storage::InMemoryBackend;

    #[test]
    fn crash_points_leave_expected_files() {
        let batch: Vec<_> = (1..=3).map(|id| record_with_links(id, 2)).collect();

        for (point, committed, staged) in [
            (CrashPoint::AfterStage, 0, 3),
            (CrashPoint::MidPromotion { committed: 2 }, 2, 3),
            (CrashPoint::BeforeClear, 3, 3),
            (CrashPoint::Completed, 3, 0),
        ] {
            let store = MemoryStore::new();
            run_until_crash(&store, &batch, point);

            let stats = store.stats().unwrap();
            assert_eq!(stats.record_log.records, committed, "{point:?}");
            assert_eq!(stats.staging_log.records, staged, "{point:?}");
        }
    }

    #[test]
    fn failing_backend_fails_after_count() {
        let mut backend = FailingBackend::new(Box::new(InMemoryBackend::new()));
        backend.fail_appends_after(1);

        assert!(backend.append(b"a\n").is_ok());
        assert!(backend.append(b"b\n").is_err());
        assert_eq!(backend.appends(), 1);

        backend.reset();
        assert!(backend.append(b"c\n").is_ok());
    }

    #[test]
    fn failing_backend_fails_reads() {
        let backend = FailingBackend::new(Box::new(InMemoryBackend::new()));
        backend.set_fail_reads(true);

        assert!(backend.reader().is_err());
        assert!(backend.size().is_err());
    }
}
