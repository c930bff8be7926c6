//! # bm Core
//!
//! Record store and matching engine for bm, a bookmark manager for shell
//! commands.
//!
//! This crate provides:
//! - [`RecordStore`]: an append-only log of [`Record`]s guarded by an
//!   advisory lock, with torn-write detection and delete-by-rewrite
//! - Base-36 ID generation for un-named records
//! - [`MatchEngine`]: exact/prefix/fuzzy lookup of records by ID or command
//!
//! ## Example
//!
//! ```rust,ignore
//! use bm_core::{Field, MatchEngine, Record, RecordStore, StoreConfig};
//!
//! let mut store = RecordStore::open(StoreConfig::default())?;
//! store.append(&Record::new("st", "git status"))?;
//!
//! let best = MatchEngine::new(&mut store).must_match_one(Field::Command, &["status"])?;
//! assert_eq!(best.id, "st");
//! store.close()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dir;
mod error;
pub mod id;
pub mod matcher;
mod reader;
mod record;
mod store;

pub use config::StoreConfig;
pub use dir::StoreDir;
pub use error::{CoreError, CoreResult};
pub use matcher::{Field, MatchEngine, Query, Tier, MAX_MATCHES};
pub use record::{Record, DELIMITER};
pub use store::RecordStore;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
