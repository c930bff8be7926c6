//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for the bookmark log.
///
/// Storage backends are **opaque byte stores**. They provide simple operations
/// for reading, appending and replacing data. The record layer owns all format
/// interpretation - backends do not understand records or line framing.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `replace` is all-or-nothing with respect to the stored content
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The read would extend beyond the current size
    /// - The backend is closed
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends data to the end of the storage.
    ///
    /// Returns the offset where the data was written. A failed append may
    /// leave a prefix of `data` behind; callers that need all-or-nothing
    /// appends must truncate back to the previous size themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Returns the current size of the storage in bytes.
    ///
    /// This is the offset where the next `append` will write.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// After this returns successfully, all previously appended data
    /// is guaranteed to survive process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Truncates the storage to the given size.
    ///
    /// This removes all data after the specified offset. The record layer
    /// uses it to roll back a failed append.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The truncation fails
    /// - `new_size` is greater than current size
    fn truncate(&mut self, new_size: u64) -> StorageResult<()>;

    /// Atomically replaces the entire content with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the replacement fails. Depending on
    /// where it failed the backend may be left closed, in which case every
    /// later call returns [`crate::StorageError::Closed`].
    fn replace(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Flushes and releases the underlying handle.
    ///
    /// Closing an already closed backend is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails. The handle is released
    /// regardless.
    fn close(&mut self) -> StorageResult<()>;
}
