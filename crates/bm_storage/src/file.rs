//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Prefix of the private staging directory used by [`FileBackend::replace`].
const STAGING_PREFIX: &str = ".bm-rewrite-";
/// Name of the staged file inside the staging directory.
const STAGING_FILE: &str = "data.tmp";

/// A file-based storage backend.
///
/// This backend provides persistent storage using OS file APIs.
/// Data survives process restarts. New files are created owner read-write
/// only on Unix.
///
/// # Durability
///
/// - `sync()` calls `File::sync_all()` to ensure data is on disk
/// - `replace()` stages the new content in a private directory next to the
///   file, syncs it, renames it over the original and syncs the parent
///   directory
///
/// # Example
///
/// ```no_run
/// use bm_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("data.log")).unwrap();
/// backend.append(b"persistent data\n").unwrap();
/// backend.sync().unwrap();  // Ensure data is durable
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: RwLock<Option<File>>,
}

impl FileBackend {
    /// Opens or creates a file backend at the given path.
    ///
    /// If the file exists, it is opened for reading and writing.
    /// If it doesn't exist, a new file is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = Self::open_options().create(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(Some(file)),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the backend currently holds an open handle.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.file.read().is_some()
    }

    fn open_options() -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(true).write(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Syncs the parent directory so a rename is durable.
    #[cfg(unix)]
    fn sync_parent_dir(&self) -> StorageResult<()> {
        let dir = File::open(self.parent_dir())?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent_dir(&self) -> StorageResult<()> {
        // NTFS journals metadata updates; directory handles cannot be synced
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut guard = self.file.write();
        let file = guard.as_mut().ok_or(StorageError::Closed)?;

        let size = file.metadata()?.len();
        let end = offset.saturating_add(len as u64);
        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut guard = self.file.write();
        let file = guard.as_mut().ok_or(StorageError::Closed)?;

        let offset = file.seek(SeekFrom::End(0))?;
        if !data.is_empty() {
            file.write_all(data)?;
        }

        Ok(offset)
    }

    fn size(&self) -> StorageResult<u64> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(file.metadata()?.len())
    }

    fn sync(&mut self) -> StorageResult<()> {
        let guard = self.file.read();
        let file = guard.as_ref().ok_or(StorageError::Closed)?;
        file.sync_all()?;
        Ok(())
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        let guard = self.file.write();
        let file = guard.as_ref().ok_or(StorageError::Closed)?;

        let size = file.metadata()?.len();
        if new_size > size {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot truncate to size {new_size} which is greater than current size {size}"),
            )));
        }

        file.set_len(new_size)?;
        file.sync_all()?;

        Ok(())
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        // Staging next to the target keeps the rename on one filesystem.
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(self.parent_dir())?;
        let staged_path = staging.path().join(STAGING_FILE);

        {
            let mut staged = Self::open_options().create_new(true).open(&staged_path)?;
            staged.write_all(data)?;
            staged.sync_all()?;
        }

        // From here on a failure leaves the backend closed.
        let mut guard = self.file.write();
        guard.take();

        fs::rename(&staged_path, &self.path)?;
        self.sync_parent_dir()?;

        let file = Self::open_options().open(&self.path)?;
        *guard = Some(file);

        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        match self.file.write().take() {
            Some(file) => {
                file.sync_all()?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_created_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let _backend = FileBackend::open(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_append_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut backend = FileBackend::open(&path).unwrap();

        let offset1 = backend.append(b"hello").unwrap();
        assert_eq!(offset1, 0);

        let offset2 = backend.append(b" world").unwrap();
        assert_eq!(offset2, 5);

        assert_eq!(backend.size().unwrap(), 11);
        assert_eq!(&backend.read_at(0, 11).unwrap(), b"hello world");
        assert_eq!(&backend.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn file_read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"hello").unwrap();

        let result = backend.read_at(3, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"persistent data").unwrap();
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 15);
        assert_eq!(&backend.read_at(0, 15).unwrap(), b"persistent data");
    }

    #[test]
    fn file_truncate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"keep|drop").unwrap();
        backend.truncate(5).unwrap();

        assert_eq!(backend.size().unwrap(), 5);
        assert_eq!(&backend.read_at(0, 5).unwrap(), b"keep|");
        assert!(backend.truncate(10).is_err());
    }

    #[test]
    fn file_replace_swaps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"old content").unwrap();
        backend.replace(b"new").unwrap();

        assert!(backend.is_open());
        assert_eq!(backend.size().unwrap(), 3);
        assert_eq!(fs::read(&path).unwrap(), b"new");

        // The handle points at the new file and keeps working.
        backend.append(b"er").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"newer");
    }

    #[test]
    fn file_replace_leaves_no_staging_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.replace(b"x").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("test.log")]);
    }

    #[test]
    fn file_replace_failure_closes_backend() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"data").unwrap();

        // A directory in place of the target makes the rename fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("blocker"), b"").unwrap();

        assert!(backend.replace(b"new").is_err());
        assert!(!backend.is_open());
        assert!(matches!(backend.size(), Err(StorageError::Closed)));
        assert!(matches!(backend.append(b"x"), Err(StorageError::Closed)));
    }

    #[test]
    fn file_close_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"data").unwrap();

        backend.close().unwrap();
        backend.close().unwrap();
        assert!(matches!(backend.read_at(0, 1), Err(StorageError::Closed)));
    }

    #[test]
    fn file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.path(), path);
    }
}
