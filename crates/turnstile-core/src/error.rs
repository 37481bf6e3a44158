//! Error types for configuration and content selection.

use thiserror::Error;

/// Errors raised while selecting or looking up corpus records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no content available")]
    EmptyCorpus,

    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Errors raised while validating a `turnstile.toml`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("routing.channels must contain at least one destination")]
    NoChannels,

    #[error("routing.channels[{0}] is blank")]
    BlankChannel(usize),

    #[error("routing.counter_name must not be empty")]
    EmptyCounterName,

    #[error("routing.counter_timeout_ms must be greater than zero")]
    ZeroTimeout,
}
