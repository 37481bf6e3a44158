//! Error types for the Turnstile counter store.

use thiserror::Error;

/// Result type alias for counter store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during counter store operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("counter {0} is at its maximum value")]
    Overflow(String),

    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}
