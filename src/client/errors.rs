//! Client errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for client calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures seen by [`super::AnalyticsClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// Caller omitted a value the request cannot be sent without
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    /// Transport, URL or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The stored user id could not be read or written
    #[error("User id file {path}: {source}")]
    UserIdFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
}

impl ClientError {
    /// HTTP status for server-side failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
