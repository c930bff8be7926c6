//! Store directory management.
//!
//! This module handles the file system layout of a bookmark store:
//!
//! ```text
//! <dir>/                      # the user's home directory by default
//! ├─ .bm_bookmark_data        # Append-only record log
//! └─ .bm_bookmark_data.lock   # Advisory lock for single-process access
//! ```
//!
//! The lock file ensures only one process uses the store at a time. It is
//! held for the whole lifetime of a [`StoreDir`].

use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Owns the store's directory layout and its advisory lock.
///
/// # Locking
///
/// [`StoreDir::open`] blocks until the exclusive lock is granted; there is no
/// timeout. The lock is released by [`StoreDir::unlock`] or, failing that,
/// when the value is dropped.
#[derive(Debug)]
pub struct StoreDir {
    /// Directory holding the store files.
    path: PathBuf,
    /// Data file name within `path`.
    data_file: String,
    /// Path of the lock file.
    lock_path: PathBuf,
    /// Lock file handle, `None` once unlocked.
    lock_file: Option<File>,
}

impl StoreDir {
    /// Resolves the store directory and acquires the exclusive lock.
    ///
    /// The directory is created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `NoHomeDir` when no directory is configured and the home
    /// directory is unknown, and `LockUnavailable` when the directory or the
    /// lock file cannot be created or the lock cannot be taken.
    pub fn open(config: &StoreConfig) -> CoreResult<Self> {
        let path = config.resolve_dir()?;
        let lock_path = path.join(&config.lock_file);
        if !path.exists() {
            fs::create_dir_all(&path).map_err(|source| CoreError::LockUnavailable {
                path: lock_path.clone(),
                source,
            })?;
        }

        let lock_file = Self::open_lock_file(&lock_path).map_err(|source| {
            CoreError::LockUnavailable {
                path: lock_path.clone(),
                source,
            }
        })?;

        debug!(path = %lock_path.display(), "waiting for store lock");
        lock_file
            .lock_exclusive()
            .map_err(|source| CoreError::LockUnavailable {
                path: lock_path.clone(),
                source,
            })?;
        debug!(path = %lock_path.display(), "store lock acquired");

        Ok(Self {
            path,
            data_file: config.data_file.clone(),
            lock_path,
            lock_file: Some(lock_file),
        })
    }

    fn open_lock_file(path: &Path) -> std::io::Result<File> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options.open(path)
    }

    /// Returns the path to the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path to the data file.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.path.join(&self.data_file)
    }

    /// Returns the path to the lock file.
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Returns true while the lock is held.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock_file.is_some()
    }

    /// Releases the lock. Unlocking twice is a no-op.
    ///
    /// The lock file handle is closed even if the unlock call fails, which
    /// releases the lock at the OS level anyway.
    pub fn unlock(&mut self) -> CoreResult<()> {
        let Some(lock_file) = self.lock_file.take() else {
            return Ok(());
        };
        let result = lock_file.unlock();
        drop(lock_file);
        debug!(path = %self.lock_path.display(), "store lock released");

        result.map_err(|source| CoreError::LockUnavailable {
            path: self.lock_path.clone(),
            source,
        })
    }
}

impl Drop for StoreDir {
    fn drop(&mut self) {
        if let Some(lock_file) = self.lock_file.take() {
            let _ = lock_file.unlock();
        }
    }
}
