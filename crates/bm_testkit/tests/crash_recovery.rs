//! Crash and rollback behavior of the record store.

use bm_core::{CoreError, Record, RecordStore, StoreConfig};
use bm_storage::InMemoryBackend;
use bm_testkit::crash::{write_torn_tail, CrashSwitch, CrashableBackend};
use bm_testkit::fixtures::{log_bytes, TestStore};

fn crashable(raw: &[u8]) -> (RecordStore, InMemoryBackend, CrashSwitch) {
    let memory = InMemoryBackend::with_data(raw.to_vec());
    let backend = CrashableBackend::new(Box::new(memory.clone()));
    let switch = backend.switch();
    let store = RecordStore::with_backend(StoreConfig::default(), Box::new(backend));
    (store, memory, switch)
}

#[test]
fn partial_append_is_rolled_back() {
    let raw = log_bytes(&[("a", "ls")]);
    let (mut store, memory, switch) = crashable(&raw);

    switch.crash_after(7);
    assert!(store.append(&Record::new("b", "pwd")).is_err());
    assert!(switch.has_crashed());
    assert_eq!(memory.data(), raw);

    switch.reset();
    store.append(&Record::new("c", "whoami")).unwrap();
    let ids: Vec<_> = store.records().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, ["a", "c"]);
}

#[test]
fn failed_sync_is_rolled_back() {
    let (mut store, memory, switch) = crashable(&[]);

    switch.set_fail_on_sync(true);
    assert!(store.append(&Record::new("a", "ls")).is_err());
    assert!(memory.data().is_empty());
}

#[test]
fn failed_rollback_leaves_detectable_torn_tail() {
    let raw = log_bytes(&[("a", "ls")]);
    let (mut store, memory, switch) = crashable(&raw);

    switch.crash_after(10);
    switch.set_fail_on_truncate(true);
    assert!(store.append(&Record::new("b", "pwd")).is_err());
    assert_eq!(memory.data().len(), raw.len() + 10);

    switch.reset();
    let err = store.records().unwrap_err();
    match err {
        CoreError::CorruptRecord { offset, .. } => assert_eq!(offset, raw.len() as u64),
        other => panic!("expected corruption, got {other}"),
    }
}

#[test]
fn failed_rewrite_invalidates_store() {
    let raw = log_bytes(&[("a", "ls"), ("b", "pwd")]);
    let (mut store, memory, switch) = crashable(&raw);

    switch.set_fail_on_replace(true);
    let err = store.delete("a").unwrap_err();
    assert!(matches!(err, CoreError::DeleteFailed { ref id, .. } if id == "a"));
    assert_eq!(memory.data(), raw);

    switch.reset();
    assert!(matches!(store.records(), Err(CoreError::StoreInvalidated)));
    assert!(matches!(
        store.append(&Record::new("c", "true")),
        Err(CoreError::StoreInvalidated)
    ));
    assert!(matches!(store.delete("b"), Err(CoreError::StoreInvalidated)));
    assert!(matches!(
        store.generate_unique_id(),
        Err(CoreError::StoreInvalidated)
    ));
}

#[test]
fn corrupt_log_aborts_delete_without_writing() {
    let mut raw = log_bytes(&[("a", "ls")]);
    raw.extend_from_slice(b"{\"ID\":\"b\"");
    let (mut store, memory, switch) = crashable(&raw);

    let err = store.delete("a").unwrap_err();
    assert!(err.is_corruption());
    assert!(!switch.has_crashed());
    assert_eq!(memory.data(), raw);

    // The store stays usable.
    store.len_bytes().unwrap();
}

#[test]
fn torn_file_tail_is_reported_after_reopen() {
    let temp = tempfile::tempdir().unwrap();
    let config = TestStore::config_for(temp.path());

    let mut store = RecordStore::open(config.clone()).unwrap();
    store.append(&Record::new("a", "ls")).unwrap();
    let clean_len = store.len_bytes().unwrap();
    store.close().unwrap();

    let data_path = temp.path().join(".bm_bookmark_data");
    write_torn_tail(&data_path, br#"{"ID":"b","Comm"#).unwrap();

    let mut store = RecordStore::open(config).unwrap();
    let err = store.records().unwrap_err();
    match err {
        CoreError::CorruptRecord { offset, .. } => assert_eq!(offset, clean_len),
        other => panic!("expected corruption, got {other}"),
    }
    store.close().unwrap();
}
