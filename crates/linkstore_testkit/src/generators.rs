//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random records that exercise the
//! line encoding: empty link maps, many links, quotes and backslashes,
//! and non-ASCII URLs.

use linkstore_core::{Record, RecordId};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Strategy for generating URLs, including non-ASCII hosts and paths.
pub fn url_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("https?://[a-z0-9.-]{1,20}/[a-zA-Z0-9_/?=&%-]{0,30}")
            .expect("Invalid regex"),
        prop::string::string_regex("https://[а-яё]{1,10}\\.рф/[а-яё0-9]{0,10}")
            .expect("Invalid regex"),
        prop::string::string_regex("http://例え\\.jp/[ぁ-んァ-ン]{0,8}").expect("Invalid regex"),
        // Characters that need escaping in JSON.
        prop::string::string_regex("http://x/[\"\\\\\t ]{1,5}").expect("Invalid regex"),
    ]
}

/// Strategy for generating link statuses.
pub fn status_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("available".to_string()),
        Just("not available".to_string()),
        prop::string::string_regex("[a-z ]{0,12}").expect("Invalid regex"),
    ]
}

/// Strategy for generating link maps of 0 to 16 entries.
pub fn links_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(url_strategy(), status_strategy(), 0..16)
}

/// Strategy for generating records with arbitrary IDs.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    (any::<RecordId>(), links_strategy()).prop_map(|(id, links)| Record { id, links })
}

/// Strategy for generating `1..max_len` strictly increasing IDs.
pub fn increasing_ids_strategy(max_len: usize) -> impl Strategy<Value = Vec<RecordId>> {
    prop::collection::btree_set(any::<RecordId>(), 1..max_len.max(2))
        .prop_map(|ids| ids.into_iter().collect())
}

/// Strategy for generating records with distinct IDs, in increasing ID order.
pub fn record_sequence_strategy(max_len: usize) -> impl Strategy<Value = Vec<Record>> {
    increasing_ids_strategy(max_len).prop_flat_map(|ids| {
        let len = ids.len();
        prop::collection::vec(links_strategy(), len).prop_map(move |maps| {
            ids.iter()
                .zip(maps)
                .map(|(&id, links)| Record { id, links })
                .collect::<Vec<Record>>()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn increasing_ids_are_strictly_increasing() {
        let mut runner = TestRunner::default();
        for _ in 0..32 {
            let ids = increasing_ids_strategy(20)
                .new_tree(&mut runner)
                .unwrap()
                .current();
            assert!(!ids.is_empty());
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
        }
    }

    proptest! {
        #[test]
        fn generated_records_encode_on_one_line(record in record_strategy()) {
            let line = record.encode_line().unwrap();
            prop_assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
            prop_assert_eq!(line.last(), Some(&b'\n'));
        }
    }
}
