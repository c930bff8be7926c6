//! Error types for bm core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in record store and matching operations.
///
/// Reaching the end of the log is not an error: [`crate::RecordStore::read_next`]
/// returns `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The advisory lock could not be created or acquired.
    #[error("store lock unavailable at {path}: {source}")]
    LockUnavailable {
        /// Path of the lock file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The data file could not be opened or created.
    #[error("store unavailable at {path}: {source}")]
    StoreUnavailable {
        /// Path of the data file.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: bm_storage::StorageError,
    },

    /// No home directory could be determined for the default store location.
    #[error("cannot determine home directory for the store")]
    NoHomeDir,

    /// Storage backend error during an operation on an open store.
    #[error("storage error: {0}")]
    Storage(#[from] bm_storage::StorageError),

    /// A log entry is torn or cannot be parsed.
    #[error("corrupt record at offset {offset}: {reason}")]
    CorruptRecord {
        /// Byte offset where the entry starts.
        offset: u64,
        /// Description of the corruption.
        reason: String,
    },

    /// Every candidate ID below the probe bound is taken.
    #[error("exhausted space of possible IDs ({bound} candidates in use)")]
    IdSpaceExhausted {
        /// Number of candidates probed.
        bound: u32,
    },

    /// No record matches the query.
    #[error("no records match the query")]
    NoMatch,

    /// Rewriting the log during a delete failed.
    #[error("failed to delete record {id}: {source}")]
    DeleteFailed {
        /// ID of the record being deleted.
        id: String,
        /// Underlying storage error.
        #[source]
        source: bm_storage::StorageError,
    },

    /// The store was invalidated by an earlier failed delete.
    #[error("store is unusable after a failed delete")]
    StoreInvalidated,

    /// The query could not be compiled into a matcher.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] regex::Error),

    /// A record could not be serialized.
    #[error("failed to encode record {id}: {source}")]
    Encode {
        /// ID of the record.
        id: String,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Creates a corrupt record error.
    pub fn corrupt_record(offset: u64, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            offset,
            reason: reason.into(),
        }
    }

    /// Returns true if the error means the log itself is damaged.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptRecord { .. })
    }
}
