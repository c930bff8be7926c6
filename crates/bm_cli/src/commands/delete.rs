//! Delete commands (`d`, `dn`).

use crate::error::CliResult;
use bm_core::{Field, MatchEngine, Record, RecordStore};

/// Deletes the best match for `query` and returns it.
pub fn run(store: &mut RecordStore, field: Field, query: &[String]) -> CliResult<Record> {
    let record = MatchEngine::new(store).must_match_one(field, query)?;
    eprintln!(
        "deleting record '{}' with command: {}",
        record.id, record.command
    );
    store.delete(&record.id)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bm_core::StoreConfig;
    use bm_storage::InMemoryBackend;

    #[test]
    fn deletes_only_best_match() {
        let mut store =
            RecordStore::with_backend(StoreConfig::default(), Box::new(InMemoryBackend::new()));
        store.append(&Record::new("build", "make")).unwrap();
        store.append(&Record::new("build-all", "make all")).unwrap();

        let deleted = run(&mut store, Field::Id, &["build".to_string()]).unwrap();
        assert_eq!(deleted.id, "build");

        let remaining: Vec<_> = store.records().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(remaining, ["build-all"]);
    }
}
