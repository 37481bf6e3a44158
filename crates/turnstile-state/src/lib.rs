//! turnstile-state — durable, serialized counters.
//!
//! Backed by [redb](https://docs.rs/redb). Each named counter is one row in
//! a `&str -> u64` table. Increments run inside a write transaction that
//! commits before the caller sees the value.
//!
//! # Architecture
//!
//! ```text
//! CounterHandle (cloneable, many callers)
//!   └── mpsc mailbox
//!         └── CounterActor (single owner, one message at a time)
//!               └── CounterStore::increment_and_fetch → redb commit → reply
//! ```
//!
//! `CounterStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`).
//! redb already serializes write transactions; the actor adds a strict FIFO
//! order and keeps blocking commits off the request tasks.

pub mod actor;
pub mod error;
pub mod store;
pub mod tables;

pub use actor::{CounterActor, CounterHandle};
pub use error::{StateError, StateResult};
pub use store::CounterStore;
