pub mod config;
pub mod corpus;
pub mod date_key;
pub mod error;
pub mod selector;
pub mod types;

pub use config::TurnstileConfig;
pub use corpus::Corpus;
pub use date_key::DateKey;
pub use error::{ConfigError, SelectionError};
pub use types::*;
