//! Error types for auphonic-batch
//!
//! A production that ends in the remote ERROR status is not an error here:
//! the workflow reports it as a missing download URL and zero bytes.

use std::path::PathBuf;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing credentials, unusable folders, bad settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed local input (e.g. preset definition without a name)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-success HTTP status from the API
    #[error("API error {status}: {body}")]
    Remote { status: u16, body: String },

    /// Transport failure before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Local input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Production never reached DONE or ERROR within the poll budget
    #[error("Production {production} not finished after {attempts} status checks")]
    Timeout { production: String, attempts: u32 },

    /// Status code outside the known enumeration
    #[error("Unknown production status code: {0}")]
    UnknownStatus(i64),

    /// Production reported DONE without any output file
    #[error("Production {0} finished without output files")]
    MissingOutput(String),

    #[error("Scan error: {0}")]
    Scan(#[from] crate::services::file_scanner::ScanError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Common error: {0}")]
    Common(#[from] auphonic_common::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
