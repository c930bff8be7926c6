//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use bm_core::{Record, RecordStore, StoreConfig};
use bm_storage::InMemoryBackend;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: RecordStore,
    /// The in-memory log, if any.
    memory: Option<InMemoryBackend>,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a store over an in-memory log.
    pub fn memory() -> Self {
        let memory = InMemoryBackend::new();
        Self {
            store: RecordStore::with_backend(StoreConfig::default(), Box::new(memory.clone())),
            memory: Some(memory),
            temp_dir: None,
        }
    }

    /// Creates a locked, file-based store in a fresh temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RecordStore::open(Self::config_for(temp_dir.path()))
            .expect("Failed to open file store");

        Self {
            store,
            memory: None,
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns a config pointing at `dir`.
    pub fn config_for(dir: &Path) -> StoreConfig {
        StoreConfig::default().dir(dir)
    }

    /// Returns the store directory if file-based, None if in-memory.
    pub fn dir(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(TempDir::path)
    }

    /// Returns the data file path if file-based, None if in-memory.
    pub fn data_path(&self) -> Option<PathBuf> {
        self.store.dir().map(|dir| dir.data_path())
    }

    /// Returns the raw log bytes.
    pub fn raw(&self) -> Vec<u8> {
        match (&self.memory, self.data_path()) {
            (Some(memory), _) => memory.data(),
            (None, Some(path)) => std::fs::read(path).expect("Failed to read data file"),
            (None, None) => Vec::new(),
        }
    }

    /// Closes the store and hands back the directory, keeping it alive.
    pub fn close(self) -> Option<TempDir> {
        self.store.close().expect("Failed to close store");
        self.temp_dir
    }
}

impl std::ops::Deref for TestStore {
    type Target = RecordStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl std::ops::DerefMut for TestStore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

/// Runs a test with a temporary in-memory store.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&mut RecordStore) -> R,
{
    let mut test_store = TestStore::memory();
    f(&mut test_store.store)
}

/// Runs a test with a temporary file-based store.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&mut RecordStore, &Path) -> R,
{
    let mut test_store = TestStore::file();
    let dir = test_store
        .temp_dir
        .as_ref()
        .map(|d| d.path().to_path_buf())
        .expect("File store should have a directory");
    f(&mut test_store.store, &dir)
}

/// Encodes `(id, command)` pairs as the bytes of a log.
pub fn log_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (id, command) in entries {
        let line = Record::new(*id, *command)
            .encode_line()
            .expect("Failed to encode record");
        bytes.extend_from_slice(&line);
    }
    bytes
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates an in-memory store holding the given records, in order.
    pub fn with_records(entries: &[(&str, &str)]) -> TestStore {
        let mut test_store = TestStore::memory();
        for (id, command) in entries {
            test_store
                .append(&Record::new(*id, *command))
                .expect("Failed to append record");
        }
        test_store
    }

    /// Creates a store over a log that starts with `raw` bytes.
    pub fn with_raw_log(raw: &[u8]) -> TestStore {
        let memory = InMemoryBackend::with_data(raw.to_vec());
        TestStore {
            store: RecordStore::with_backend(StoreConfig::default(), Box::new(memory.clone())),
            memory: Some(memory),
            temp_dir: None,
        }
    }
}
