//! Store configuration.

use crate::error::{CoreError, CoreResult};
use std::path::PathBuf;

/// Default name of the data file.
pub const DATA_FILE_NAME: &str = ".bm_bookmark_data";

/// Default name of the lock file, a sibling of the data file.
pub const LOCK_FILE_NAME: &str = ".bm_bookmark_data.lock";

/// Default number of candidates probed when generating an ID.
pub const DEFAULT_MAX_GENERATED_IDS: u32 = 1_000_000;

/// Configuration for opening a record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the data and lock files. `None` means the user's
    /// home directory.
    pub dir: Option<PathBuf>,

    /// File name of the append-only log.
    pub data_file: String,

    /// File name of the advisory lock.
    pub lock_file: String,

    /// Upper bound (exclusive) of the counter probed by ID generation.
    pub max_generated_ids: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: None,
            data_file: DATA_FILE_NAME.to_string(),
            lock_file: LOCK_FILE_NAME.to_string(),
            max_generated_ids: DEFAULT_MAX_GENERATED_IDS,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory holding the store files.
    #[must_use]
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Sets the data file name.
    #[must_use]
    pub fn data_file(mut self, name: impl Into<String>) -> Self {
        self.data_file = name.into();
        self
    }

    /// Sets the lock file name.
    #[must_use]
    pub fn lock_file(mut self, name: impl Into<String>) -> Self {
        self.lock_file = name.into();
        self
    }

    /// Sets the ID probe bound.
    #[must_use]
    pub const fn max_generated_ids(mut self, bound: u32) -> Self {
        self.max_generated_ids = bound;
        self
    }

    /// Resolves the store directory, falling back to the home directory.
    pub fn resolve_dir(&self) -> CoreResult<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir().ok_or(CoreError::NoHomeDir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert!(config.dir.is_none());
        assert_eq!(config.data_file, ".bm_bookmark_data");
        assert_eq!(config.lock_file, ".bm_bookmark_data.lock");
        assert_eq!(config.max_generated_ids, 1_000_000);
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new()
            .dir("/tmp/bm")
            .data_file("data")
            .lock_file("data.lock")
            .max_generated_ids(36);

        assert_eq!(config.resolve_dir().unwrap(), PathBuf::from("/tmp/bm"));
        assert_eq!(config.data_file, "data");
        assert_eq!(config.lock_file, "data.lock");
        assert_eq!(config.max_generated_ids, 36);
    }
}
