//! Line splitting over backend readers.

use linkstore_storage::ReadSeek;
use std::io::{BufRead, BufReader, Split};

/// Splits a reader on `\n`, yielding each line without its terminator.
///
/// Lines are raw bytes so that a torn or non-UTF-8 tail does not abort
/// iteration; decoding is the caller's decision.
pub(crate) fn split_lines(reader: Box<dyn ReadSeek>) -> Split<BufReader<Box<dyn ReadSeek>>> {
    BufReader::new(reader).split(b'\n')
}

/// Returns true if the line holds nothing but whitespace.
pub(crate) fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}
