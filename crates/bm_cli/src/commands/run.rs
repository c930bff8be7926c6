//! Lookup for the run commands (`r`, `rn`).

use crate::commands::Outcome;
use crate::error::CliResult;
use bm_core::{Field, MatchEngine, RecordStore};

/// Resolves the best match for `query` and schedules it for execution.
pub fn run(store: &mut RecordStore, field: Field, query: &[String]) -> CliResult<Outcome> {
    let record = MatchEngine::new(store).must_match_one(field, query)?;
    Ok(Outcome::Execute(record))
}
