//! Error types for ahrefs-api.

use ahrefs_http::TransportError;
use ahrefs_schema::SchemaError;
use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced to callers of the client.
///
/// Per-request network failures are not represented here: they degrade to an
/// empty body plus a diagnostic record.
#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("API token is required")]
    #[diagnostic(
        code(ahrefs_api::missing_token),
        help("Pass a non-empty token or set the AHREFS_TOKEN environment variable")
    )]
    MissingToken,

    #[error("Error while reading config file {path}: {source}")]
    #[diagnostic(code(ahrefs_api::config_io))]
    ConfigIo {
        path: String,
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    #[diagnostic(
        code(ahrefs_api::config_parse),
        help("Check your config file syntax and structure")
    )]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    #[error("Unknown operation: {0}")]
    #[diagnostic(
        code(ahrefs_api::unknown_operation),
        help("Supported verbs are set, to, get, prepare, mode, select, order, where, having and params")
    )]
    UnknownOperation(String),

    #[error("Function {0} not found")]
    #[diagnostic(
        code(ahrefs_api::unknown_function),
        help("Check the table, operator or option name, or disable schema checking for unregistered tables")
    )]
    UnknownFunction(String),

    #[error("{call} is missing argument #{position}")]
    #[diagnostic(code(ahrefs_api::missing_argument))]
    MissingArgument { call: String, position: usize },

    #[error("Query validation failed: {}", .errors.join("; "))]
    #[diagnostic(
        code(ahrefs_api::validation),
        help("{}", .errors.join("\n"))
    )]
    Validation { errors: Vec<String> },
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
