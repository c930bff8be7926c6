//! Crash testing for bm.
//!
//! This module provides a storage backend that fails on demand, so tests
//! can check what the store leaves behind when a write, sync, rollback or
//! rewrite fails part way.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bm_testkit::crash::CrashableBackend;
//!
//! let backend = CrashableBackend::new(Box::new(InMemoryBackend::new()));
//! let switch = backend.switch();
//! let mut store = RecordStore::with_backend(StoreConfig::default(), Box::new(backend));
//! switch.crash_after(10);
//! assert!(store.append(&Record::new("a", "ls")).is_err());
//! ```

use bm_storage::{StorageBackend, StorageError, StorageResult};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct CrashState {
    crash_after_bytes: AtomicUsize,
    bytes_written: AtomicUsize,
    crashed: AtomicBool,
    fail_on_sync: AtomicBool,
    fail_on_truncate: AtomicBool,
    fail_on_replace: AtomicBool,
}

impl Default for CrashState {
    fn default() -> Self {
        Self {
            crash_after_bytes: AtomicUsize::new(usize::MAX),
            bytes_written: AtomicUsize::new(0),
            crashed: AtomicBool::new(false),
            fail_on_sync: AtomicBool::new(false),
            fail_on_truncate: AtomicBool::new(false),
            fail_on_replace: AtomicBool::new(false),
        }
    }
}

/// Remote control for a [`CrashableBackend`].
///
/// The backend is usually boxed into a store; the switch stays with the test.
#[derive(Debug, Clone)]
pub struct CrashSwitch {
    state: Arc<CrashState>,
}

impl CrashSwitch {
    /// Fails the append that would take the total written past `bytes`,
    /// after writing the part that fits.
    pub fn crash_after(&self, bytes: usize) {
        let written = self.state.bytes_written.load(Ordering::SeqCst);
        self.state
            .crash_after_bytes
            .store(written.saturating_add(bytes), Ordering::SeqCst);
    }

    /// Sets whether sync should fail.
    pub fn set_fail_on_sync(&self, fail: bool) {
        self.state.fail_on_sync.store(fail, Ordering::SeqCst);
    }

    /// Sets whether truncate should fail.
    pub fn set_fail_on_truncate(&self, fail: bool) {
        self.state.fail_on_truncate.store(fail, Ordering::SeqCst);
    }

    /// Sets whether replace should fail.
    ///
    /// A failed replace closes the inner backend, the way a failed file
    /// rewrite leaves no usable handle.
    pub fn set_fail_on_replace(&self, fail: bool) {
        self.state.fail_on_replace.store(fail, Ordering::SeqCst);
    }

    /// Clears every fault.
    pub fn reset(&self) {
        self.state.crash_after_bytes.store(usize::MAX, Ordering::SeqCst);
        self.state.crashed.store(false, Ordering::SeqCst);
        self.state.fail_on_sync.store(false, Ordering::SeqCst);
        self.state.fail_on_truncate.store(false, Ordering::SeqCst);
        self.state.fail_on_replace.store(false, Ordering::SeqCst);
    }

    /// Returns whether any fault has fired.
    pub fn has_crashed(&self) -> bool {
        self.state.crashed.load(Ordering::SeqCst)
    }
}

/// A storage backend wrapper that can simulate crashes.
pub struct CrashableBackend {
    inner: Box<dyn StorageBackend>,
    state: Arc<CrashState>,
}

impl CrashableBackend {
    /// Creates a new crashable backend wrapping an inner backend.
    pub fn new(inner: Box<dyn StorageBackend>) -> Self {
        Self {
            inner,
            state: Arc::new(CrashState::default()),
        }
    }

    /// Returns a switch controlling this backend's faults.
    pub fn switch(&self) -> CrashSwitch {
        CrashSwitch {
            state: Arc::clone(&self.state),
        }
    }

    fn crash(&self, what: &str) -> StorageError {
        self.state.crashed.store(true, Ordering::SeqCst);
        StorageError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("simulated crash during {what}"),
        ))
    }
}

impl StorageBackend for CrashableBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, bytes: &[u8]) -> StorageResult<u64> {
        let current = self
            .state
            .bytes_written
            .fetch_add(bytes.len(), Ordering::SeqCst);
        let threshold = self.state.crash_after_bytes.load(Ordering::SeqCst);

        if current >= threshold {
            return Err(self.crash("write"));
        }

        if current + bytes.len() > threshold {
            let partial_len = threshold - current;
            if partial_len > 0 {
                let _ = self.inner.append(&bytes[..partial_len]);
            }
            return Err(self.crash("partial write"));
        }

        self.inner.append(bytes)
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn sync(&mut self) -> StorageResult<()> {
        if self.state.fail_on_sync.load(Ordering::SeqCst) {
            return Err(self.crash("sync"));
        }
        self.inner.sync()
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        if self.state.fail_on_truncate.load(Ordering::SeqCst) {
            return Err(self.crash("truncate"));
        }
        self.inner.truncate(new_size)
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        if self.state.fail_on_replace.load(Ordering::SeqCst) {
            let _ = self.inner.close();
            return Err(self.crash("replace"));
        }
        self.inner.replace(data)
    }

    fn close(&mut self) -> StorageResult<()> {
        self.inner.close()
    }
}

/// Appends `bytes` to the file at `path` without a trailing delimiter,
/// leaving the torn record an interrupted writer would.
pub fn write_torn_tail(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
