//! CLI command implementations.
//!
//! Commands work on an open store and never close it. A command that wants
//! to run a record returns [`Outcome::Execute`] so the caller can release the
//! store lock before the child process starts.

pub mod delete;
pub mod list;
pub mod run;
pub mod save;

use bm_core::Record;

/// What to do once the store is closed.
#[derive(Debug)]
pub enum Outcome {
    /// Nothing left to do.
    Done,
    /// Run the record.
    Execute(Record),
}
