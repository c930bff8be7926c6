//! CLI error type.

use bm_core::CoreError;
use std::io;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by `bm` sub-commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Store or matching error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A named save would reuse an ID that is taken.
    #[error("cannot use name: {0}")]
    NameTaken(String),

    /// A full listing found nothing.
    #[error("no records found")]
    NoRecords,

    /// The stored command could not be started.
    #[error("failed to start command '{id}': {source}")]
    Spawn {
        /// ID of the record being run.
        id: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The stored command was killed by a signal.
    #[error("command '{0}' terminated by signal")]
    Terminated(String),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
