//! Approximate record lookup.
//!
//! A query is a list of words. The words are escaped and joined by a
//! separator that accepts any run of spaces, tabs or newlines, and the
//! result is compiled three times:
//!
//! | tier     | anchoring        |
//! |----------|------------------|
//! | `Exact`  | whole field      |
//! | `Prefix` | start of field   |
//! | `Fuzzy`  | anywhere         |
//!
//! Each record lands in the most specific tier it satisfies. Results are
//! ordered least relevant first: all fuzzy matches, then prefix, then exact,
//! each tier in log order. The best match is therefore the last element.

use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::store::RecordStore;
use regex::Regex;

/// Separator placed between query words.
const WORD_SEPARATOR: &str = "[ \t\n]+?";

/// Number of results shown by a listing query.
pub const MAX_MATCHES: usize = 10;

/// Which record field a query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The record ID.
    Id,
    /// The command text.
    Command,
}

impl Field {
    /// Selects this field from a record.
    #[must_use]
    pub fn of(self, record: &Record) -> &str {
        match self {
            Field::Id => &record.id,
            Field::Command => &record.command,
        }
    }
}

/// How specifically a field matched, least specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// The query occurs somewhere in the field.
    Fuzzy,
    /// The field starts with the query.
    Prefix,
    /// The field is the query.
    Exact,
}

/// A compiled query.
#[derive(Debug, Clone)]
pub struct Query {
    fuzzy: Regex,
    prefix: Regex,
    exact: Regex,
}

impl Query {
    /// Compiles a query from its words.
    ///
    /// Words are matched literally. An empty word list matches every field,
    /// exactly only when the field is empty.
    pub fn new<S: AsRef<str>>(words: &[S]) -> CoreResult<Self> {
        let pattern = words
            .iter()
            .map(|word| regex::escape(word.as_ref()))
            .collect::<Vec<_>>()
            .join(WORD_SEPARATOR);

        // `^` and `$` anchor to the whole field, not to lines within it.
        Ok(Self {
            fuzzy: Regex::new(&pattern)?,
            prefix: Regex::new(&format!("^{pattern}"))?,
            exact: Regex::new(&format!("^{pattern}$"))?,
        })
    }

    /// Returns the most specific tier `text` satisfies.
    #[must_use]
    pub fn classify(&self, text: &str) -> Option<Tier> {
        if self.exact.is_match(text) {
            Some(Tier::Exact)
        } else if self.prefix.is_match(text) {
            Some(Tier::Prefix)
        } else if self.fuzzy.is_match(text) {
            Some(Tier::Fuzzy)
        } else {
            None
        }
    }
}

/// Runs queries against a store.
#[derive(Debug)]
pub struct MatchEngine<'s> {
    store: &'s mut RecordStore,
}

impl<'s> MatchEngine<'s> {
    /// Creates an engine over `store`.
    pub fn new(store: &'s mut RecordStore) -> Self {
        Self { store }
    }

    /// Returns every matching record, least relevant first.
    ///
    /// # Errors
    ///
    /// Propagates scan errors, including `CorruptRecord`.
    pub fn match_records<S: AsRef<str>>(
        &mut self,
        field: Field,
        words: &[S],
    ) -> CoreResult<Vec<Record>> {
        let query = Query::new(words)?;

        let mut fuzzy = Vec::new();
        let mut prefix = Vec::new();
        let mut exact = Vec::new();

        self.store.reset()?;
        while let Some(record) = self.store.read_next()? {
            match query.classify(field.of(&record)) {
                Some(Tier::Exact) => exact.push(record),
                Some(Tier::Prefix) => prefix.push(record),
                Some(Tier::Fuzzy) => fuzzy.push(record),
                None => {}
            }
        }

        fuzzy.append(&mut prefix);
        fuzzy.append(&mut exact);
        Ok(fuzzy)
    }

    /// Returns the `n` most relevant matches, least relevant first.
    pub fn top<S: AsRef<str>>(
        &mut self,
        field: Field,
        words: &[S],
        n: usize,
    ) -> CoreResult<Vec<Record>> {
        let mut records = self.match_records(field, words)?;
        let skip = records.len().saturating_sub(n);
        Ok(records.split_off(skip))
    }

    /// Returns the single most relevant match.
    ///
    /// # Errors
    ///
    /// Returns `NoMatch` if nothing matches.
    pub fn must_match_one<S: AsRef<str>>(
        &mut self,
        field: Field,
        words: &[S],
    ) -> CoreResult<Record> {
        self.match_records(field, words)?
            .pop()
            .ok_or(CoreError::NoMatch)
    }
}
