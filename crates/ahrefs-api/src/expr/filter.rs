//! Raw filter triples and their serialization.

use std::fmt;

use ahrefs_schema::Schema;

use crate::{
    error::{ApiError, Result},
    expr::ops::Operator,
    value::Value,
};

/// The clause a filter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    /// Applied before aggregation.
    Where,
    /// Applied after aggregation.
    Having,
}

impl Clause {
    pub fn as_str(self) -> &'static str {
        match self {
            Clause::Where => "where",
            Clause::Having => "having",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unserialized `(operator, column, value)` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub operator: String,
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn new(operator: impl Into<String>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            operator: operator.into(),
            column: column.into(),
            value: value.into(),
        }
    }

    /// Renders the filter as an API predicate.
    ///
    /// Comparison values are quoted according to the column (its declared
    /// type, or membership of the always-quoted set); function values
    /// according to the function name.
    pub fn serialize(&self, clause: Clause, schema: &Schema) -> Result<String> {
        match Operator::parse(&self.operator) {
            Operator::Comparison(cmp) => {
                let value = wrap_value(&self.value, &self.column, schema);
                Ok(format!("{}{}{}", self.column, cmp.symbol(), value))
            }
            Operator::Function(name) => {
                let value = wrap_value(&self.value, name, schema);
                Ok(format!("{}({},{})", name, self.column, value))
            }
            Operator::Unknown(name) => Err(ApiError::UnknownFunction(format!("{clause}_{name}"))),
        }
    }
}

/// Wraps `value` in double quotes, backslash-escaping quotes, backslashes and NUL.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' | '\'' | '\\' => {
                quoted.push('\\');
                quoted.push(ch);
            }
            '\0' => quoted.push_str("\\0"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

fn wrap_value(value: &Value, name: &str, schema: &Schema) -> String {
    if schema.is_quoted(name) {
        return quote(&value.to_string());
    }
    match schema.column_type(name) {
        Some(value_type) if value_type.is_quoted() => quote(&value.to_string()),
        _ => value.to_string(),
    }
}
