//! Listing commands (`q`, `qn`, `a`, `an`).

use crate::error::{CliError, CliResult};
use crate::output;
use bm_core::{CoreError, Field, MatchEngine, RecordStore, MAX_MATCHES};
use std::io::Write;

/// How many matches a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// The most relevant [`MAX_MATCHES`] matches.
    Top,
    /// Every match.
    All,
}

/// Prints the records matching `query`, most relevant last.
pub fn run(
    store: &mut RecordStore,
    field: Field,
    query: &[String],
    listing: Listing,
    out: &mut dyn Write,
    tty: bool,
) -> CliResult<()> {
    let mut engine = MatchEngine::new(store);
    let records = match listing {
        Listing::Top => engine.top(field, query, MAX_MATCHES)?,
        Listing::All => engine.match_records(field, query)?,
    };

    if records.is_empty() {
        return Err(match listing {
            Listing::Top => CoreError::NoMatch.into(),
            Listing::All => CliError::NoRecords,
        });
    }

    output::print_records(out, &records, tty)?;
    Ok(())
}
