//! Error types for the export pipeline
//!
//! Malformed data (locations, fragment ids) and contract violations fail
//! fast. Missing optional collaborators are never errors: filters and
//! renderers treat them as "not applicable" and pass through.

use thiserror::Error;

/// Top-level export error type
#[derive(Debug, Error)]
pub enum ExportError {
    /// Unparseable location, fragment id or similar data string
    #[error("invalid format: {0}")]
    Format(String),

    /// Location resolved outside of the base text
    #[error("location out of range: {0}")]
    OutOfRange(String),

    /// Caller passed an argument violating the call contract
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Component id not present in the registry
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// Configuration or component options could not be read
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Head/tail template failed to compile or render
    #[error("template error: {0}")]
    Template(#[from] mustache::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
