//! Property-based test generators using proptest.
//!
//! Provides strategies for generating records and queries.

use bm_core::Record;
use proptest::prelude::*;

/// Strategy for generating record names.
pub fn record_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9][a-z0-9_-]{0,11}").expect("Invalid regex")
}

/// Strategy for generating single command words.
pub fn word_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9./=_-]{1,8}").expect("Invalid regex")
}

/// Strategy for generating command text.
///
/// Commands may contain quotes, tabs and newlines, all of which the log
/// must carry through JSON escaping.
pub fn command_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => word_strategy(),
            1 => Just("\"quoted\"".to_string()),
            1 => Just("a\tb".to_string()),
            1 => Just("line\nbreak".to_string()),
            1 => Just("ünï".to_string()),
        ],
        0..6,
    )
    .prop_map(|words| words.join(" "))
}

/// Strategy for generating records.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    (record_id_strategy(), command_strategy()).prop_map(|(id, command)| Record::new(id, command))
}

/// Strategy for generating a list of records with distinct IDs.
pub fn distinct_records_strategy(max: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::btree_map(record_id_strategy(), command_strategy(), 0..max).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(id, command)| Record::new(id, command))
                .collect()
        },
    )
}

/// Strategy for generating queries of zero or more words.
pub fn query_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(word_strategy(), 0..4)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn record_ids_are_non_empty(id in record_id_strategy()) {
            prop_assert!(!id.is_empty());
            prop_assert!(id.len() <= 12);
        }

        #[test]
        fn distinct_records_have_unique_ids(records in distinct_records_strategy(16)) {
            let mut ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), records.len());
        }
    }
}
