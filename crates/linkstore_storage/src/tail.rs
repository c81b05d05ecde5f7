//! Backward scan for the final line of a newline-delimited file.
//!
//! The scan starts at the end of the input and reads fixed-size chunks
//! towards the beginning until it finds the newline that precedes the last
//! line. A single trailing newline terminates the last line rather than
//! starting an empty one, so `"a\nb\n"` and `"a\nb"` both yield `b`.
//!
//! Work is bounded by the length of the last line plus at most one chunk,
//! independent of how much history precedes it. A chunk size of 1 degrades
//! to a byte-at-a-time scan with identical results.

use crate::error::StorageResult;
use std::io::{Read, Seek, SeekFrom};

/// Chunk size used when the caller has no better estimate of line length.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Returns the bytes of the last line of `reader`, without its terminator.
///
/// Returns `Ok(None)` if the input is empty. A chunk size of zero is
/// treated as one.
///
/// # Errors
///
/// Returns an error if seeking or reading fails.
pub fn read_last_line<R>(reader: &mut R, chunk_size: usize) -> StorageResult<Option<Vec<u8>>>
where
    R: Read + Seek + ?Sized,
{
    let size = reader.seek(SeekFrom::End(0))?;
    if size == 0 {
        return Ok(None);
    }

    let chunk_size = chunk_size.max(1) as u64;
    // Pieces are collected tail first and reversed once at the end.
    let mut pieces: Vec<Vec<u8>> = Vec::new();
    let mut end = size;
    let mut at_tail = true;

    while end > 0 {
        let start = end.saturating_sub(chunk_size);
        let mut buf = vec![0u8; (end - start) as usize];
        reader.seek(SeekFrom::Start(start))?;
        reader.read_exact(&mut buf)?;

        if at_tail {
            at_tail = false;
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
        }

        if let Some(pos) = buf.iter().rposition(|&b| b == b'\n') {
            pieces.push(buf.split_off(pos + 1));
            break;
        }

        pieces.push(buf);
        end = start;
    }

    Ok(Some(pieces.into_iter().rev().flatten().collect()))
}
