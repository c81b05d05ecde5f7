//! Benchmark utilities.

use linkstore_core::{LinkStore, Record, RecordId, StoreConfig};
use linkstore_storage::InMemoryBackend;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tempfile::TempDir;

const STATUSES: [&str; 3] = ["available", "not available", "redirect"];

/// Generate a random URL with a path of `path_len` characters.
pub fn random_url(path_len: usize) -> String {
    let mut rng = rand::thread_rng();
    let host: String = (&mut rng).sample_iter(&Alphanumeric).take(10).map(char::from).collect();
    let path: String = (&mut rng).sample_iter(&Alphanumeric).take(path_len).map(char::from).collect();
    format!("https://{}.example/{}", host.to_lowercase(), path)
}

/// Generate a record with `link_count` random links.
pub fn random_record(id: RecordId, link_count: usize) -> Record {
    let mut rng = rand::thread_rng();
    (0..link_count).fold(Record::new(id), |record, _| {
        let status = STATUSES[rng.gen_range(0..STATUSES.len())];
        record.with_link(random_url(rng.gen_range(8..48)), status)
    })
}

/// Generate records `1..=count`, each with `link_count` random links.
pub fn generate_records(count: usize, link_count: usize) -> Vec<Record> {
    (1..=count as RecordId)
        .map(|id| random_record(id, link_count))
        .collect()
}

/// An in-memory store pre-filled with `records`.
pub fn memory_store(records: &[Record]) -> LinkStore {
    let store = LinkStore::open_with_backends(
        Box::new(InMemoryBackend::new()),
        Box::new(InMemoryBackend::new()),
    );
    for record in records {
        store.save(record).expect("Failed to save record");
    }
    store
}

/// A file-backed store in a fresh temporary directory, pre-filled with `records`.
///
/// The directory lives as long as the returned `TempDir`.
pub fn file_store(records: &[Record]) -> (TempDir, LinkStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = LinkStore::open(StoreConfig::new(temp_dir.path())).expect("Failed to open store");
    for record in records {
        store.save(record).expect("Failed to save record");
    }
    (temp_dir, store)
}
