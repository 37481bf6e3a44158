//! turnstile-router — round-robin channel selection.
//!
//! The router holds no counter of its own. Each decision asks a
//! [`SequenceSource`] for the next value of a named durable counter and
//! reduces it modulo the channel count. Fairness is exactly as strong as
//! the source's serialization.
//!
//! # Architecture
//!
//! ```text
//! RoundRobinRouter::route(message)
//!   ├── SequenceSource::next_value(counter_name)   (timeout-bounded)
//!   │     ├── LocalSequence  → CounterHandle (same process)
//!   │     └── RemoteSequence → POST /internal/counters/{name}/increment
//!   ├── ok(v)  → index = v mod N
//!   ├── err    → index = 0, degraded
//!   └── whatsapp_url(channel, message)
//! ```

pub mod error;
pub mod link;
pub mod router;
pub mod sequence;

pub use error::CoordinationError;
pub use router::RoundRobinRouter;
pub use sequence::{LocalSequence, RemoteSequence, SequenceSource};
