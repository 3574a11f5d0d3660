//! Prepared queries and batch results, both keyed by table name.

use crate::query::state::QueryParams;

/// Queries stashed by `prepare_*` calls, waiting for a batch run.
///
/// Preparing the same table twice replaces the earlier query but keeps its
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedBatch {
    entries: Vec<(String, QueryParams)>,
}

impl PreparedBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: impl Into<String>, query: QueryParams) {
        let table = table.into();
        match self.entries.iter_mut().find(|(t, _)| *t == table) {
            Some((_, q)) => *q = query,
            None => self.entries.push((table, query)),
        }
    }

    pub fn get(&self, table: &str) -> Option<&QueryParams> {
        self.entries
            .iter()
            .find(|(t, _)| t == table)
            .map(|(_, q)| q)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the batch, returning its entries in preparation order.
    pub fn take(&mut self) -> Vec<(String, QueryParams)> {
        std::mem::take(&mut self.entries)
    }
}

/// Raw response bodies of a batch run, one per prepared table.
///
/// A request that failed at the transport level has an empty body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResults {
    entries: Vec<(String, String)>,
}

impl BatchResults {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self {
            entries,
        }
    }

    pub fn get(&self, table: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == table)
            .map(|(_, body)| body.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, body)| (t.as_str(), body.as_str()))
    }
}

impl IntoIterator for BatchResults {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
