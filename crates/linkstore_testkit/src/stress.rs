//! Stress tests for LinkStore.
//!
//! These helpers drive a shared store from many threads and then check the
//! record log line by line for torn or interleaved writes.

use crate::fixtures::record_with_links;
use linkstore_core::{LinkStore, Record, RecordId};
use linkstore_storage::{FileBackend, StorageBackend};
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent threads.
    pub threads: usize,
    /// Records saved by each thread.
    pub records_per_thread: usize,
    /// Links carried by each record.
    pub links_per_record: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            records_per_thread: 200,
            links_per_record: 4,
        }
    }
}

impl StressConfig {
    /// Every ID the concurrent writers will save.
    pub fn expected_ids(&self) -> BTreeSet<RecordId> {
        (0..self.threads)
            .flat_map(|t| (0..self.records_per_thread).map(move |i| thread_record_id(t, i)))
            .collect()
    }
}

/// Distinct ID for the `i`-th record of thread `t`.
fn thread_record_id(t: usize, i: usize) -> RecordId {
    (t * 1_000_000 + i) as RecordId + 1
}

/// Saves distinct records from `config.threads` threads at once.
pub fn stress_concurrent_saves(store: Arc<LinkStore>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let records = config.records_per_thread;
            let links = config.links_per_record;

            thread::spawn(move || {
                for i in 0..records {
                    let record = record_with_links(thread_record_id(t, i), links);
                    match store.save(&record) {
                        Ok(()) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Runs writers alongside threads doing lookups, staging and last-ID recovery.
///
/// Every reader operation counts as successful unless it returns an error
/// other than not-found.
pub fn stress_mixed_operations(store: Arc<LinkStore>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();

    let readers: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let ops = config.records_per_thread;

            thread::spawn(move || {
                for i in 0..ops {
                    let ok = match i % 3 {
                        0 => match store.get(thread_record_id(t, i)) {
                            Ok(_) => true,
                            Err(err) => err.is_not_found(),
                        },
                        1 => store.stage(&Record::new(thread_record_id(t, i))).is_ok(),
                        _ => {
                            store.recover_last_id();
                            true
                        }
                    };
                    if ok {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    let writes = stress_concurrent_saves(Arc::clone(&store), config);

    for handle in readers {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed) + writes.successful_ops,
        failed.load(Ordering::Relaxed) + writes.failed_ops,
        start.elapsed(),
    )
}

/// Outcome of reading a record log line by line.
#[derive(Debug, Clone, Default)]
pub struct LogIntegrity {
    /// IDs of every line that decoded.
    pub ids: Vec<RecordId>,
    /// 1-based numbers of lines that did not decode.
    pub bad_lines: Vec<usize>,
}

/// Decodes every line of the log at `path` independently.
///
/// # Panics
///
/// Panics if the file cannot be read.
pub fn check_log_integrity(path: &Path) -> LogIntegrity {
    let backend = FileBackend::open_existing(path).expect("Log file missing");
    let reader = BufReader::new(backend.reader().expect("Failed to open log"));

    let mut integrity = LogIntegrity::default();
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line.expect("Failed to read log line");
        match Record::decode(&line) {
            Ok(record) => integrity.ids.push(record.id),
            Err(_) => integrity.bad_lines.push(index + 1),
        }
    }
    integrity
}
