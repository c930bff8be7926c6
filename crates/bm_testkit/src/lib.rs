//! # bm Testkit
//!
//! Test utilities for bm.
//!
//! This crate provides:
//! - Test fixtures over temporary directories and in-memory logs
//! - A fault-injecting storage backend for crash and rollback tests
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bm_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     let mut store = TestStore::file();
//!     store.append(&Record::new("st", "git status")).unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use bm_core::{Field, MatchEngine, Record, RecordStore, StoreConfig};
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;
