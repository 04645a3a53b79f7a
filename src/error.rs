use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading Terraform configuration text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
}

/// Errors that can occur while loading or writing a state document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Failed to parse state JSON: {0}")]
    JsonParseError(String),

    #[error("State document root must be a JSON object")]
    NotAnObject,

    #[error("State 'resources' must be an array, found {0}")]
    InvalidResources(String),

    #[error("Failed to serialize state JSON: {0}")]
    SerializeError(String),
}

/// Errors that can occur while migrating a single file in place.
///
/// Every variant carries the path so that a driver processing many files can
/// report which one failed and carry on with the rest.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to migrate state '{path}': {source}")]
    State {
        path: PathBuf,
        #[source]
        source: StateError,
    },

    #[error("Cannot tell whether '{0}' is configuration or state; pass the document kind explicitly")]
    UnknownDocumentKind(PathBuf),
}
