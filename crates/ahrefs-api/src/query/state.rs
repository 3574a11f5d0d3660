//! Accumulated parameters of the query being built.

use tracing::trace;
use url::form_urlencoded::byte_serialize;

use crate::expr::{Clause, Filter};

/// Parameters that survive a reset.
const CARRIED_PARAMS: [&str; 3] = ["output", "target", "mode"];

/// An insertion-ordered `key=value` list.
///
/// Setting an existing key replaces its value in place, so the wire order is
/// the order in which keys were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Appends to a comma-joined composite, creating it when absent.
    pub fn append(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        let key = key.into();
        let value = value.as_ref();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => {
                v.push(',');
                v.push_str(value);
            }
            None => self.pairs.push((key, value.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serializes as `k1=v1&k2=v2`, form-urlencoding the values.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, byte_serialize(v.as_bytes()).collect::<String>()))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// The query under construction: wire parameters plus the raw filters they
/// were serialized from.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    params: QueryParams,
    where_filters: Vec<Filter>,
    having_filters: Vec<Filter>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryState {
    /// A fresh state with `output=json`.
    pub fn new() -> Self {
        let mut params = QueryParams::new();
        params.set("output", "json");
        Self {
            params,
            where_filters: Vec::new(),
            having_filters: Vec::new(),
        }
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        trace!(key = key.as_str(), value = value.as_str(), "setting parameter");
        self.params.set(key, value);
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        let key = key.into();
        trace!(key = key.as_str(), value = value.as_ref(), "appending to parameter");
        self.params.append(key, value);
    }

    /// Records `filter` and appends its serialized form to the clause composite.
    pub fn push_filter(&mut self, clause: Clause, filter: Filter, serialized: &str) {
        self.append(clause.as_str(), serialized);
        match clause {
            Clause::Where => self.where_filters.push(filter),
            Clause::Having => self.having_filters.push(filter),
        }
    }

    pub fn filters(&self, clause: Clause) -> &[Filter] {
        match clause {
            Clause::Where => &self.where_filters,
            Clause::Having => &self.having_filters,
        }
    }

    /// Drops everything except `output`, `target` and `mode`.
    pub fn reset(&mut self) {
        let mut params = QueryParams::new();
        for key in CARRIED_PARAMS {
            if let Some(value) = self.params.get(key) {
                params.set(key, value);
            }
        }
        self.params = params;
        self.where_filters.clear();
        self.having_filters.clear();
    }
}
