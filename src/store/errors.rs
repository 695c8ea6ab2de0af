//! Event store errors

use thiserror::Error;

/// Result type for event store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by the persistence gateway
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying SQLite call failed; displays SQLite's own message
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous holder of the connection panicked
    #[error("connection lock poisoned")]
    LockPoisoned,

    /// The blocking task running the store call did not complete
    #[error("store task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Task(e.to_string())
    }
}
