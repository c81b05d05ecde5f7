//! The persisted record type and its line encoding.
//!
//! Each record is stored as one JSON object followed by `\n`:
//!
//! ```text
//! {"id":17,"links":{"https://a.example":"available","https://b.example":"not available"}}
//! ```
//!
//! Link keys are written in sorted order, so the same record always encodes
//! to the same bytes.

use crate::error::CoreResult;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Caller-assigned record identifier.
pub type RecordId = i64;

/// The result of one link-check batch: an ID and the status of every URL checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, expected to increase across successive saves.
    pub id: RecordId,
    /// URL to observed status.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub links: BTreeMap<String, String>,
}

impl Record {
    /// Creates a record with no links.
    #[must_use]
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            links: BTreeMap::new(),
        }
    }

    /// Adds a link and returns the record.
    #[must_use]
    pub fn with_link(mut self, url: impl Into<String>, status: impl Into<String>) -> Self {
        self.links.insert(url.into(), status.into());
        self
    }

    /// Encodes the record as one newline-terminated JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Serialization`] if encoding fails.
    pub fn encode_line(&self) -> CoreResult<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Decodes a record from one line, with or without its terminator.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Serialization`] if the bytes are not a record.
    pub fn decode(line: &[u8]) -> CoreResult<Self> {
        Ok(serde_json::from_slice(line)?)
    }
}

// Older writers emitted `"links":null` for a record without links.
fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn encode_line_format() {
        let record = Record::new(1)
            .with_link("http://b", "not available")
            .with_link("http://a", "available");

        let line = record.encode_line().unwrap();
        assert_eq!(
            line,
            br#"{"id":1,"links":{"http://a":"available","http://b":"not available"}}
"#
        );
    }

    #[test]
    fn empty_links_encode_as_object() {
        let line = Record::new(2).encode_line().unwrap();
        assert_eq!(line, b"{\"id\":2,\"links\":{}}\n");
    }

    #[test]
    fn decode_with_terminator() {
        let record = Record::decode(b"{\"id\":5,\"links\":{\"http://x\":\"ok\"}}\n").unwrap();
        assert_eq!(record, Record::new(5).with_link("http://x", "ok"));
    }

    #[test]
    fn decode_null_or_missing_links() {
        assert_eq!(Record::decode(br#"{"id":3,"links":null}"#).unwrap(), Record::new(3));
        assert_eq!(Record::decode(br#"{"id":4}"#).unwrap(), Record::new(4));
    }

    #[test]
    fn decode_non_ascii_urls() {
        let record = Record::new(9).with_link("https://例え.jp/パス", "available");
        let line = record.encode_line().unwrap();
        assert_eq!(Record::decode(&line).unwrap(), record);
    }

    #[test]
    fn decode_rejects_partial_line() {
        let result = Record::decode(br#"{"id":6,"links":{"http://a":"av"#);
        assert!(matches!(result, Err(CoreError::Serialization(_))));
    }

    #[test]
    fn decode_rejects_blank_line() {
        assert!(Record::decode(b"").is_err());
        assert!(Record::decode(b"   ").is_err());
    }
}
