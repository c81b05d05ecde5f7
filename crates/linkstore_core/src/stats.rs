//! Store statistics and integrity summaries.
//!
//! Unlike point lookups, a summary reads every line of a log, so it is meant
//! for tooling and health checks rather than the request path.

use crate::error::CoreResult;
use crate::lines::{is_blank, split_lines};
use crate::record::{Record, RecordId};
use linkstore_storage::StorageBackend;

/// Line-level summary of one log file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSummary {
    /// File size in bytes.
    pub size: u64,
    /// Lines that decoded as records.
    pub records: usize,
    /// Lines holding only whitespace.
    pub blank_lines: usize,
    /// 1-based numbers of lines that failed to decode.
    pub unreadable_lines: Vec<usize>,
    /// Smallest and largest ID seen, if any record decoded.
    pub id_range: Option<(RecordId, RecordId)>,
}

impl LogSummary {
    /// Returns true if every non-blank line decoded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unreadable_lines.is_empty()
    }
}

/// Statistics for both logs of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Summary of the record log.
    pub record_log: LogSummary,
    /// Summary of the staging log.
    pub staging_log: LogSummary,
    /// Result of the tail scan on the record log.
    pub last_id: RecordId,
}

pub(crate) fn summarize(backend: &dyn StorageBackend) -> CoreResult<LogSummary> {
    let mut summary = LogSummary {
        size: backend.size()?,
        ..LogSummary::default()
    };

    for (index, line) in split_lines(backend.reader()?).enumerate() {
        let line = line?;
        if is_blank(&line) {
            summary.blank_lines += 1;
            continue;
        }

        match Record::decode(&line) {
            Ok(record) => {
                summary.records += 1;
                summary.id_range = Some(match summary.id_range {
                    Some((lo, hi)) => (lo.min(record.id), hi.max(record.id)),
                    None => (record.id, record.id),
                });
            }
            Err(_) => summary.unreadable_lines.push(index + 1),
        }
    }

    Ok(summary)
}
