//! Router error types.

use std::time::Duration;

use thiserror::Error;

/// Why the counter store could not supply a value.
///
/// Every variant means the same thing to the router: the store is
/// unavailable and the fallback channel is used.
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("counter store unreachable: {0}")]
    Unreachable(String),

    #[error("counter store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("counter store returned status {0}")]
    Status(u16),

    #[error("invalid counter store response: {0}")]
    InvalidResponse(String),

    #[error("invalid counter store endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("counter store error: {0}")]
    Store(#[from] turnstile_state::StateError),
}
