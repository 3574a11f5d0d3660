//! Schema checks run before a query is sent.
//!
//! Every violation is collected; nothing is sent unless the list is empty.

use ahrefs_schema::{ColumnSpec, Schema, TableSchema, SUBSCRIPTION_INFO};
use tracing::debug;

use crate::{expr::Clause, query::state::QueryState};

const REQUIRED_PARAMS: [&str; 2] = ["target", "mode"];
const SORT_DIRECTIONS: [&str; 2] = ["asc", "desc"];

/// Checks a [`QueryState`] against a [`Schema`].
pub struct Validator<'a> {
    schema: &'a Schema,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
        }
    }

    /// Column, sort-direction and filter-flag checks for the table in `from`.
    pub fn check_columns(&self, state: &QueryState) -> Vec<String> {
        let mut errors = Vec::new();
        let Some(table_name) = state.get("from") else {
            return errors;
        };
        let Some(table) = self.schema.table(table_name) else {
            errors.push(format!("Unknown table {table_name}"));
            return errors;
        };

        if let Some(select) = state.get("select") {
            for column in split_list(select) {
                if !table.contains(column) {
                    errors.push(format!("No column {column} to select in table {table_name}"));
                }
            }
        }

        if let Some(order_by) = state.get("order_by") {
            for entry in split_list(order_by) {
                let parts: Vec<&str> = entry.split(':').collect();
                if parts.len() == 2 && !SORT_DIRECTIONS.contains(&parts[1]) {
                    errors.push(format!(
                        "Unknown option {} to order_by in table {table_name}",
                        parts[1]
                    ));
                }
                if !table.contains(parts[0]) {
                    errors.push(format!(
                        "No column {} to order_by in table {table_name}",
                        parts[0]
                    ));
                }
            }
        }

        for clause in [Clause::Where, Clause::Having] {
            self.check_filters(&mut errors, state, clause, table, table_name);
        }

        debug!(table = table_name, errors = errors.len(), "checked columns");
        errors
    }

    fn check_filters(
        &self,
        errors: &mut Vec<String>,
        state: &QueryState,
        clause: Clause,
        table: &TableSchema,
        table_name: &str,
    ) {
        for filter in state.filters(clause) {
            let column = &filter.column;
            match table.column(column) {
                None => {
                    errors.push(format!(
                        "No column {column} for '{clause}' condition in table {table_name}"
                    ));
                }
                Some(spec) if !usable_in(spec, clause) => {
                    errors.push(format!(
                        "Column {column} can not be used in '{clause}' condition in table {table_name}"
                    ));
                }
                Some(_) => {}
            }
        }
    }
}

/// `target` and `mode` must be present and non-empty, except for the
/// subscription info table.
pub fn check_required(state: &QueryState) -> Vec<String> {
    if state.get("from") == Some(SUBSCRIPTION_INFO) {
        return Vec::new();
    }
    REQUIRED_PARAMS
        .iter()
        .filter(|param| state.get(param).map_or(true, str::is_empty))
        .map(|param| format!("{param} is required"))
        .collect()
}

fn usable_in(spec: &ColumnSpec, clause: Clause) -> bool {
    match clause {
        Clause::Where => spec.usable_in_where,
        Clause::Having => spec.usable_in_having,
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').filter(|item| !item.is_empty())
}
