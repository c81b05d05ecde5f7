//! The staging log: records written but not yet confirmed committed.
//!
//! A caller stages a record before performing the work it describes, saves
//! it to the record log afterwards and then clears the staging log. Whatever
//! is still staged at start-up is the residue of an interrupted sequence.
//!
//! Loading is strict: staged records are meant to be re-driven exactly, so
//! the first line that does not decode aborts the load. Whitespace-only
//! lines are ignored.

use crate::error::CoreResult;
use crate::lines::{is_blank, split_lines};
use crate::record::Record;
use crate::stats::{summarize, LogSummary};
use linkstore_storage::StorageBackend;
use tracing::{debug, error};

/// Transient append-only buffer of unconfirmed records.
///
/// Like [`crate::RecordLog`], it relies on [`crate::LinkStore`] for locking.
pub struct StagingLog {
    backend: Box<dyn StorageBackend>,
}

impl StagingLog {
    /// Creates a staging log over `backend`.
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Appends one record as a JSON line.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the record cannot be encoded, or a
    /// storage error if the append fails.
    pub fn stage(&mut self, record: &Record) -> CoreResult<()> {
        let line = record.encode_line()?;

        if let Err(err) = self.backend.append(&line) {
            error!(path = %self.backend.location(), id = record.id, error = %err, "failed to write staged record");
            return Err(err.into());
        }

        debug!(id = record.id, "record staged");
        Ok(())
    }

    /// Returns every staged record in file order.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the log cannot be read, or a serialization
    /// error naming the first line that does not decode.
    pub fn load(&self) -> CoreResult<Vec<Record>> {
        let mut records = Vec::new();

        for (index, line) in split_lines(self.backend.reader()?).enumerate() {
            let line = line?;
            if is_blank(&line) {
                continue;
            }

            match Record::decode(&line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    error!(path = %self.backend.location(), line = index + 1, error = %err, "failed to decode staged record");
                    return Err(err);
                }
            }
        }

        Ok(records)
    }

    /// Truncates the staging log to empty.
    ///
    /// Only call this once every record returned by the latest
    /// [`StagingLog::load`] has been saved to the record log.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the truncation fails.
    pub fn clear(&mut self) -> CoreResult<()> {
        self.backend.truncate()?;
        debug!("staging log cleared");
        Ok(())
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
