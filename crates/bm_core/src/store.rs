//! The record store.
//!
//! A [`RecordStore`] owns the store lock, the log backend and a read cursor.
//! Records are appended at the end of the log and discovered by scanning it
//! from the start; deleting a record rewrites the whole log without it.
//!
//! # Crash safety
//!
//! - Every append is synced before it returns.
//! - A failed append is rolled back by truncating to the previous end. The
//!   rollback itself can fail; the store logs that and returns the original
//!   error, and the next scan reports the leftover fragment as corrupt.
//! - A scan that ends in a non-delimited fragment reports `CorruptRecord`
//!   instead of a clean end, so a torn write is never mistaken for the end
//!   of the log.
//! - Deletes replace the log atomically. A delete that fails after the scan
//!   invalidates the store handle.
//!
//! # Concurrency
//!
//! The store is single-threaded. Other processes are kept out by the
//! advisory lock, held from [`RecordStore::open`] until
//! [`RecordStore::close`] or drop.

use crate::config::StoreConfig;
use crate::dir::StoreDir;
use crate::error::{CoreError, CoreResult};
use crate::id;
use crate::reader::{LogCursor, LogLine};
use crate::record::{Record, DELIMITER};
use bm_storage::{FileBackend, StorageBackend};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Handle to an open bookmark store.
///
/// # Example
///
/// ```rust,ignore
/// use bm_core::{Record, RecordStore, StoreConfig};
///
/// let mut store = RecordStore::open(StoreConfig::default())?;
/// let id = store.generate_unique_id()?;
/// store.append(&Record::new(id, "git status"))?;
/// store.close()?;
/// ```
pub struct RecordStore {
    config: StoreConfig,
    /// Declared before `dir`: on drop the data file closes before the lock
    /// is released, the same order as [`RecordStore::close`].
    backend: Box<dyn StorageBackend>,
    /// Directory and lock; `None` for stores built over a bare backend.
    dir: Option<StoreDir>,
    cursor: LogCursor,
    /// Set by a failed delete.
    invalidated: bool,
}

impl RecordStore {
    /// Opens the store described by `config`.
    ///
    /// Blocks until the store lock is acquired, then opens or creates the
    /// data file. If the data file cannot be opened the lock is released
    /// before returning.
    ///
    /// # Errors
    ///
    /// Returns `LockUnavailable` if the lock cannot be obtained and
    /// `StoreUnavailable` if the data file cannot be opened or created.
    pub fn open(config: StoreConfig) -> CoreResult<Self> {
        let dir = StoreDir::open(&config)?;
        let data_path = dir.data_path();
        let backend = FileBackend::open(&data_path).map_err(|source| {
            CoreError::StoreUnavailable {
                path: data_path.clone(),
                source,
            }
        })?;
        debug!(path = %data_path.display(), "store opened");

        Ok(Self {
            config,
            dir: Some(dir),
            backend: Box::new(backend),
            cursor: LogCursor::default(),
            invalidated: false,
        })
    }

    /// Opens the store in the user's home directory.
    pub fn open_default() -> CoreResult<Self> {
        Self::open(StoreConfig::default())
    }

    /// Builds a store over an existing backend without taking a lock.
    ///
    /// Used for in-memory stores and fault-injection tests.
    #[must_use]
    pub fn with_backend(config: StoreConfig, backend: Box<dyn StorageBackend>) -> Self {
        Self {
            config,
            dir: None,
            backend,
            cursor: LogCursor::default(),
            invalidated: false,
        }
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the store directory, if this store is file-backed.
    #[must_use]
    pub fn dir(&self) -> Option<&StoreDir> {
        self.dir.as_ref()
    }

    /// Returns the size of the log in bytes.
    pub fn len_bytes(&self) -> CoreResult<u64> {
        self.ensure_usable()?;
        Ok(self.backend.size()?)
    }

    /// Moves the read cursor to the start of the log.
    pub fn reset(&mut self) -> CoreResult<()> {
        self.ensure_usable()?;
        self.cursor.reset();
        Ok(())
    }

    /// Reads the record at the cursor and advances past it.
    ///
    /// Returns `Ok(None)` at a clean end of the log.
    ///
    /// # Errors
    ///
    /// Returns `CorruptRecord` if the log ends in a non-delimited fragment
    /// or a line, blank lines included, does not parse as a record. A torn
    /// tail is reported again on every read until the cursor is moved.
    pub fn read_next(&mut self) -> CoreResult<Option<Record>> {
        Ok(self.read_entry()?.map(|(_, record)| record))
    }

    /// Reads the next record together with its raw line.
    fn read_entry(&mut self) -> CoreResult<Option<(Vec<u8>, Record)>> {
        self.ensure_usable()?;
        match self.cursor.next_line(self.backend.as_ref())? {
            LogLine::End => Ok(None),
            LogLine::Torn { offset, bytes } => Err(CoreError::corrupt_record(
                offset,
                format!("log ends in a {}-byte fragment without delimiter", bytes.len()),
            )),
            LogLine::Complete { offset, bytes } => {
                let record = Record::decode_line(&bytes, offset)?;
                Ok(Some((bytes, record)))
            }
        }
    }

    /// Scans the whole log and returns every record in file order.
    pub fn records(&mut self) -> CoreResult<Vec<Record>> {
        self.reset()?;
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Appends a record at the end of the log.
    ///
    /// The write is synced before returning. On failure the log is truncated
    /// back to its previous end on a best-effort basis. The cursor is left at
    /// the end of the log either way.
    ///
    /// The store does not check ID uniqueness; see [`Self::id_in_use`].
    pub fn append(&mut self, record: &Record) -> CoreResult<()> {
        self.ensure_usable()?;
        let line = record.encode_line()?;
        let end = self.backend.size()?;

        let written = self
            .backend
            .append(&line)
            .and_then(|_| self.backend.sync());

        if let Err(err) = written {
            if let Err(rollback) = self.backend.truncate(end) {
                warn!(
                    id = %record.id,
                    offset = end,
                    error = %rollback,
                    "failed to roll back partial append; log may end in a torn record"
                );
            }
            let at = self.backend.size().unwrap_or(end);
            self.cursor.seek(at);
            return Err(err.into());
        }

        self.cursor.seek(end + line.len() as u64);
        debug!(id = %record.id, offset = end, "record appended");
        Ok(())
    }

    /// Returns true if any record in the log has the given ID.
    ///
    /// Leaves the cursor at the end of the log.
    pub fn id_in_use(&mut self, id: &str) -> CoreResult<bool> {
        self.reset()?;
        let mut found = false;
        while let Some(record) = self.read_next()? {
            if record.id == id {
                found = true;
            }
        }
        Ok(found)
    }

    /// Returns the first base-36 counter spelling not used as an ID.
    ///
    /// The ID is not reserved: calling this twice without an append in
    /// between may return the same ID.
    ///
    /// # Errors
    ///
    /// Returns `IdSpaceExhausted` if every candidate below the configured
    /// bound is taken.
    pub fn generate_unique_id(&mut self) -> CoreResult<String> {
        self.reset()?;
        let mut in_use = HashSet::new();
        while let Some(record) = self.read_next()? {
            in_use.insert(record.id);
        }

        let bound = self.config.max_generated_ids;
        id::first_unused(&in_use, bound).ok_or(CoreError::IdSpaceExhausted { bound })
    }

    /// Removes every record with the given ID by rewriting the log.
    ///
    /// Returns the number of records removed. Surviving records are copied
    /// byte for byte in their original order.
    ///
    /// # Errors
    ///
    /// A corrupt log aborts the delete before anything is written, leaving
    /// the store usable. A failure while replacing the log returns
    /// `DeleteFailed` and invalidates the store: every later operation
    /// returns `StoreInvalidated`.
    pub fn delete(&mut self, id: &str) -> CoreResult<usize> {
        self.reset()?;
        let mut kept = Vec::new();
        let mut removed = 0;
        while let Some((line, record)) = self.read_entry()? {
            if record.id == id {
                removed += 1;
                continue;
            }
            kept.extend_from_slice(&line);
            kept.push(DELIMITER);
        }

        if let Err(source) = self.backend.replace(&kept) {
            self.invalidated = true;
            warn!(id, error = %source, "log rewrite failed; store invalidated");
            return Err(CoreError::DeleteFailed {
                id: id.to_string(),
                source,
            });
        }

        self.cursor.seek(kept.len() as u64);
        debug!(id, removed, "record deleted");
        Ok(removed)
    }

    /// Closes the data file, then releases the lock.
    ///
    /// Both steps are always attempted; the first error is returned.
    pub fn close(mut self) -> CoreResult<()> {
        let closed = self.backend.close().map_err(CoreError::from);
        let unlocked = match self.dir.take() {
            Some(mut dir) => dir.unlock(),
            None => Ok(()),
        };
        closed.and(unlocked)
    }

    fn ensure_usable(&self) -> CoreResult<()> {
        if self.invalidated {
            return Err(CoreError::StoreInvalidated);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("config", &self.config)
            .field("dir", &self.dir)
            .field("cursor", &self.cursor.position())
            .field("invalidated", &self.invalidated)
            .finish()
    }
}
