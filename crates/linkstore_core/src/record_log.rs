//! The record log: append-only history of committed records.
//!
//! ## Read policies
//!
//! - **Point lookup** decodes each line independently and skips lines that
//!   do not decode. A crash mid-append leaves a torn final line; it must
//!   not hide the records before it.
//! - **Last-ID recovery** reads only the final line, backwards from the end
//!   of the file, and reports every failure as ID 0.
//!
//! ## Invariants
//!
//! - Lines are only ever appended; nothing here rewrites or deletes one
//! - Uniqueness and ordering of IDs are the caller's responsibility

use crate::error::{CoreError, CoreResult};
use crate::lines::split_lines;
use crate::record::{Record, RecordId};
use crate::stats::{summarize, LogSummary};
use linkstore_storage::{read_last_line, StorageBackend};
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, error, trace, warn};

/// Append-only store of committed records.
///
/// `RecordLog` is not synchronized on its own; [`crate::LinkStore`] owns it
/// behind the store-wide lock.
pub struct RecordLog {
    backend: Box<dyn StorageBackend>,
    tail_chunk_size: usize,
}

impl RecordLog {
    /// Creates a record log over `backend`.
    pub fn new(backend: Box<dyn StorageBackend>, tail_chunk_size: usize) -> Self {
        Self {
            backend,
            tail_chunk_size,
        }
    }

    /// Appends one record as a JSON line.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the record cannot be encoded, or a
    /// storage error if the append fails.
    pub fn save(&mut self, record: &Record) -> CoreResult<()> {
        let line = record.encode_line()?;

        if let Err(err) = self.backend.append(&line) {
            error!(path = %self.backend.location(), id = record.id, error = %err, "failed to write record");
            return Err(err.into());
        }

        debug!(id = record.id, links = record.links.len(), "record saved");
        Ok(())
    }

    /// Returns the first record whose ID equals `id`.
    ///
    /// Scans the whole log in file order. Lines that fail to decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RecordNotFound`] if no line matches, or an I/O
    /// error if the log cannot be read.
    pub fn get(&self, id: RecordId) -> CoreResult<Record> {
        for (index, line) in split_lines(self.backend.reader()?).enumerate() {
            let line = line?;
            match Record::decode(&line) {
                Ok(record) if record.id == id => return Ok(record),
                Ok(_) => {}
                Err(err) => trace!(line = index + 1, error = %err, "skipping undecodable line"),
            }
        }

        Err(CoreError::RecordNotFound { id })
    }

    /// Returns the ID of the last record in the log, or 0.
    ///
    /// 0 covers an empty log and every failure of the tail scan alike;
    /// failures are logged. Use [`RecordLog::try_last_id`] to tell them apart.
    pub fn last_id(&self) -> RecordId {
        match self.try_last_id() {
            Ok(id) => id.unwrap_or(0),
            Err(err) => {
                error!(path = %self.backend.location(), error = %err, "failed to recover last record id");
                0
            }
        }
    }

    /// Returns the ID of the last record, `None` for an empty log.
    ///
    /// Reads only the final line. Cost does not depend on how many records
    /// precede it.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or its last line does not
    /// decode.
    pub fn try_last_id(&self) -> CoreResult<Option<RecordId>> {
        if self.backend.size()? == 0 {
            return Ok(None);
        }

        let mut reader = self.backend.reader()?;
        match read_last_line(&mut *reader, self.tail_chunk_size)? {
            Some(line) => Ok(Some(Record::decode(&line)?.id)),
            None => Ok(None),
        }
    }

    /// Terminates a final line left without its newline by an interrupted
    /// append.
    ///
    /// Without this, the next record would be appended onto the torn
    /// fragment and become undecodable as well. Returns true if a newline
    /// was appended.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the log cannot be read or appended to.
    pub fn seal_torn_tail(&mut self) -> CoreResult<bool> {
        if self.backend.size()? == 0 {
            return Ok(false);
        }

        let mut reader = self.backend.reader()?;
        let mut last = [0u8; 1];
        reader.seek(SeekFrom::End(-1))?;
        reader.read_exact(&mut last)?;
        drop(reader);

        if last[0] == b'\n' {
            return Ok(false);
        }

        self.backend.append(b"\n")?;
        warn!(path = %self.backend.location(), "terminated torn final line in record log");
        Ok(true)
    }

    /// Reads every line and summarizes the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    pub fn summary(&self) -> CoreResult<LogSummary> {
        summarize(self.backend.as_ref())
    }

    /// Location of the underlying storage.
    #[must_use]
    pub fn location(&self) -> String {
        self.backend.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkstore_storage::{FileBackend, InMemoryBackend};
    use tempfile::tempdir;

    fn memory_log() -> (RecordLog, InMemoryBackend) {
        let backend = InMemoryBackend::new();
        (RecordLog::new(Box::new(backend.clone()), 8), backend)
    }

    #[test]
    fn save_appends_json_line() {
        let (mut log, backend) = memory_log();
        log.save(&Record::new(1).with_link("http://a", "ok")).unwrap();

        assert_eq!(backend.data(), b"{\"id\":1,\"links\":{\"http://a\":\"ok\"}}\n");
    }

    #[test]
    fn get_returns_first_match() {
        let (mut log, _) = memory_log();
        log.save(&Record::new(1).with_link("http://a", "first")).unwrap();
        log.save(&Record::new(2)).unwrap();
        log.save(&Record::new(1).with_link("http://a", "second")).unwrap();

        let found = log.get(1).unwrap();
        assert_eq!(found.links["http://a"], "first");
    }

    #[test]
    fn get_on_empty_log_is_not_found() {
        let (log, _) = memory_log();
        assert!(matches!(log.get(1), Err(CoreError::RecordNotFound { id: 1 })));
    }

    #[test]
    fn get_skips_undecodable_lines() {
        let (mut log, backend) = memory_log();
        backend.inject(b"not json\n\n");
        log.save(&Record::new(4)).unwrap();
        backend.inject(b"{\"id\":5,\"links\":{\"ht");

        assert_eq!(log.get(4).unwrap(), Record::new(4));
        assert!(log.get(5).unwrap_err().is_not_found());
    }

    #[test]
    fn last_id_of_empty_log_is_zero() {
        let (log, _) = memory_log();
        assert_eq!(log.last_id(), 0);
        assert_eq!(log.try_last_id().unwrap(), None);
    }

    #[test]
    fn last_id_reads_final_line() {
        let (mut log, _) = memory_log();
        for id in [3, 10, 42] {
            log.save(&Record::new(id).with_link("https://example.com/a/long/path", "available"))
                .unwrap();
        }

        assert_eq!(log.last_id(), 42);
        assert_eq!(log.try_last_id().unwrap(), Some(42));
    }

    #[test]
    fn last_id_is_not_max_id() {
        let (mut log, _) = memory_log();
        log.save(&Record::new(9)).unwrap();
        log.save(&Record::new(2)).unwrap();

        assert_eq!(log.last_id(), 2);
    }

    #[test]
    fn last_id_without_trailing_newline() {
        let backend = InMemoryBackend::with_data(b"{\"id\":1,\"links\":{}}\n{\"id\":2,\"links\":{}}".to_vec());
        let log = RecordLog::new(Box::new(backend), 3);

        assert_eq!(log.last_id(), 2);
    }

    #[test]
    fn torn_tail_collapses_to_zero() {
        let (mut log, backend) = memory_log();
        log.save(&Record::new(7)).unwrap();
        backend.inject(b"{\"id\":8,\"li");

        assert_eq!(log.last_id(), 0);
        assert!(matches!(log.try_last_id(), Err(CoreError::Serialization(_))));
    }

    #[test]
    fn missing_file_collapses_to_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("links.jsonl");
        let mut log = RecordLog::new(Box::new(FileBackend::create(&path).unwrap()), 16);
        log.save(&Record::new(1)).unwrap();

        std::fs::remove_file(&path).unwrap();

        assert_eq!(log.last_id(), 0);
        assert!(log.try_last_id().is_err());
        assert!(matches!(log.get(1), Err(CoreError::Storage(_))));
    }

    #[test]
    fn seal_torn_tail_rescues_next_save() {
        let (mut log, backend) = memory_log();
        log.save(&Record::new(1)).unwrap();
        backend.inject(b"{\"id\":2,\"li");

        assert!(log.seal_torn_tail().unwrap());
        assert!(!log.seal_torn_tail().unwrap());

        log.save(&Record::new(3)).unwrap();
        assert_eq!(log.get(3).unwrap(), Record::new(3));
        assert_eq!(log.last_id(), 3);
    }

    #[test]
    fn seal_is_noop_on_clean_or_empty_log() {
        let (mut log, backend) = memory_log();
        assert!(!log.seal_torn_tail().unwrap());

        log.save(&Record::new(1)).unwrap();
        let before = backend.data();
        assert!(!log.seal_torn_tail().unwrap());
        assert_eq!(backend.data(), before);
    }

    #[test]
    fn summary_counts_records() {
        let (mut log, _) = memory_log();
        log.save(&Record::new(1)).unwrap();
        log.save(&Record::new(2)).unwrap();

        let summary = log.summary().unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.id_range, Some((1, 2)));
    }
}
