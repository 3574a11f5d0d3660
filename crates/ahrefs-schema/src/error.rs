//! Error types for ahrefs-schema.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while loading a schema.
#[derive(Error, Diagnostic, Debug)]
pub enum SchemaError {
    #[error("Schema parse error: {0}")]
    #[diagnostic(
        code(ahrefs_schema::parse),
        help("Check the schema file syntax; column types must be one of string, numeric, date or boolean")
    )]
    Parse(#[from] toml::de::Error),

    #[error("Error while reading schema file {path}: {source}")]
    #[diagnostic(code(ahrefs_schema::io))]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
