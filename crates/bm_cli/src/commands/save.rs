//! Save commands (`s`, `sn`, `un`, and the save half of `c`, `cn`, `xn`).

use crate::error::{CliError, CliResult};
use bm_core::{Record, RecordStore};

/// How a named save treats an existing record with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// Refuse with `cannot use name`.
    Fail,
    /// Delete the existing record first.
    Replace,
}

/// Saves `args`, joined by single spaces, as a new record.
///
/// Without a name the record gets the first free generated ID.
pub fn run(
    store: &mut RecordStore,
    name: Option<&str>,
    args: &[String],
    on_conflict: OnConflict,
) -> CliResult<Record> {
    let id = match name {
        Some(name) => {
            if store.id_in_use(name)? {
                if on_conflict == OnConflict::Fail {
                    return Err(CliError::NameTaken(name.to_string()));
                }
                store.delete(name)?;
            }
            name.to_string()
        }
        None => store.generate_unique_id()?,
    };

    let record = Record::new(id, args.join(" "));
    store.append(&record)?;
    eprintln!("created record with ID {}", record.id);

    Ok(record)
}
