//! The schema registry.
//!
//! A [`Schema`] maps every table the API serves to its columns and their
//! capability flags, and records the operation table consulted when a
//! `verb_noun` call is dispatched. It is immutable once loaded and is shared
//! read-only between queries.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs,
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SchemaError};

/// Declared type of a column's values.
///
/// Drives value quoting when a filter on the column is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Numeric,
    Date,
    Boolean,
}

impl ValueType {
    /// Whether values of this type are sent as quoted literals.
    pub fn is_quoted(self) -> bool {
        matches!(self, ValueType::String | ValueType::Date)
    }
}

/// Capability flags of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub value_type: ValueType,

    /// Usable in the pre-aggregation `where` clause.
    #[serde(rename = "where", default)]
    pub usable_in_where: bool,

    /// Usable in the post-aggregation `having` clause.
    #[serde(rename = "having", default)]
    pub usable_in_having: bool,
}

impl ColumnSpec {
    pub const fn new(value_type: ValueType, usable_in_where: bool, usable_in_having: bool) -> Self {
        Self {
            value_type,
            usable_in_where,
            usable_in_having,
        }
    }
}

/// Columns of one table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TableSchema {
    columns: HashMap<String, ColumnSpec>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a column.
    pub fn with_column(mut self, name: impl Into<String>, spec: ColumnSpec) -> Self {
        self.columns.insert(name.into(), spec);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnSpec)> {
        self.columns.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Static description of the API: tables, columns, registered operations and
/// the names whose values are always quoted.
///
/// # Example
///
/// ```
/// use ahrefs_schema::{ColumnSpec, Schema, TableSchema, ValueType};
///
/// let schema = Schema::new()
///     .with_table(
///         "pages",
///         TableSchema::new().with_column("url", ColumnSpec::new(ValueType::String, true, true)),
///     )
///     .with_operation("get", "pages");
///
/// assert!(schema.is_operation("get", "pages"));
/// assert_eq!(schema.column_type("url"), Some(ValueType::String));
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Schema {
    /// Operation or column names whose filter values are always quoted.
    #[serde(default)]
    quoted: BTreeSet<String>,

    /// Verb -> nouns accepted after it (`get` -> table names, `where` -> operators, ...).
    #[serde(default)]
    operations: BTreeMap<String, BTreeSet<String>>,

    #[serde(default)]
    tables: BTreeMap<String, TableSchema>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a schema from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let schema: Schema = toml::from_str(content)?;
        debug!(
            tables = schema.tables.len(),
            verbs = schema.operations.len(),
            "loaded schema"
        );
        Ok(schema)
    }

    /// Reads and parses a schema file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| {
            SchemaError::Io {
                path: path.display().to_string(),
                source,
            }
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_table(mut self, name: impl Into<String>, table: TableSchema) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    pub fn with_operation(mut self, verb: impl Into<String>, name: impl Into<String>) -> Self {
        self.operations
            .entry(verb.into())
            .or_default()
            .insert(name.into());
        self
    }

    pub fn with_quoted(mut self, name: impl Into<String>) -> Self {
        self.quoted.insert(name.into());
        self
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableSchema)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnSpec> {
        self.table(table).and_then(|t| t.column(column))
    }

    /// Declared type of `column` in the first table (by name) that defines it.
    pub fn column_type(&self, column: &str) -> Option<ValueType> {
        self.tables
            .values()
            .find_map(|table| table.column(column))
            .map(|spec| spec.value_type)
    }

    /// Whether `verb_name` is a registered operation.
    pub fn is_operation(&self, verb: &str, name: &str) -> bool {
        self.operations
            .get(verb)
            .is_some_and(|names| names.contains(name))
    }

    /// Whether values passed to `name` (an operator, function or column) are always quoted.
    pub fn is_quoted(&self, name: &str) -> bool {
        self.quoted.contains(name)
    }
}
