//! Shared types used across Turnstile crates.

use serde::{Deserialize, Serialize};

/// One entry of the selection corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Stable reference label, e.g. `"JHN 3:16"`.
    pub ref_key: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

/// Outcome of one round-robin decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingResult {
    pub phone: String,
    pub index: usize,
    pub wa_url: String,
    /// Set when the counter store was unavailable and the fixed fallback
    /// channel was used. Serialized as `error: true`, omitted otherwise.
    #[serde(rename = "error", default, skip_serializing_if = "is_false")]
    pub degraded: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}
