use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum TransportError {
    #[error("Failed to start the request worker pool: {0}")]
    #[diagnostic(
        code(ahrefs_http::runtime),
        help("The process may have hit its thread or file descriptor limit")
    )]
    Runtime(#[source] std::io::Error),

    #[error("Batch could not be issued: {0}")]
    #[diagnostic(
        code(ahrefs_http::batch),
        help("Check your internet connection or try again later")
    )]
    Batch(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
