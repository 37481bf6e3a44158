//! Round-robin router over a fixed channel list.
//!
//! Sequencing is delegated entirely to a durable counter reached through a
//! [`SequenceSource`]; the router itself keeps no mutable state and can be
//! replicated freely.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use turnstile_core::ConfigError;
use turnstile_core::RoutingResult;
use turnstile_core::config::RoutingConfig;

use crate::error::CoordinationError;
use crate::link::whatsapp_url;
use crate::sequence::SequenceSource;

/// Channel used whenever the counter store cannot be consulted.
pub const FALLBACK_INDEX: usize = 0;

/// Picks the next destination from the channel list.
pub struct RoundRobinRouter {
    channels: Arc<[String]>,
    default_message: String,
    counter_name: String,
    timeout: Duration,
    sequence: Arc<dyn SequenceSource>,
}

impl RoundRobinRouter {
    /// Build a router from validated routing config.
    pub fn new(
        config: &RoutingConfig,
        sequence: Arc<dyn SequenceSource>,
    ) -> Result<Self, ConfigError> {
        if config.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        Ok(Self {
            channels: config.channels.clone().into(),
            default_message: config.default_message.clone(),
            counter_name: config.counter_name.clone(),
            timeout: config.counter_timeout(),
            sequence,
        })
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Choose the next channel and build its deep link.
    ///
    /// Never fails: if the counter store errors or exceeds the timeout, the
    /// channel at [`FALLBACK_INDEX`] is returned with `degraded` set.
    pub async fn route(&self, message: Option<&str>) -> RoutingResult {
        let message = match message.map(str::trim) {
            Some(m) if !m.is_empty() => m,
            _ => self.default_message.as_str(),
        };

        let (index, degraded) = match self.next_index().await {
            Ok(index) => {
                debug!(index, counter = %self.counter_name, "routed");
                (index, false)
            }
            Err(e) => {
                warn!(error = %e, counter = %self.counter_name, "counter store unavailable, using fallback channel");
                (FALLBACK_INDEX, true)
            }
        };

        let phone = self.channels[index].clone();
        let wa_url = whatsapp_url(&phone, message);
        RoutingResult {
            phone,
            index,
            wa_url,
            degraded,
        }
    }

    async fn next_index(&self) -> Result<usize, CoordinationError> {
        let value = tokio::time::timeout(self.timeout, self.sequence.next_value(&self.counter_name))
            .await
            .map_err(|_| CoordinationError::Timeout(self.timeout))??;
        Ok((value % self.channels.len() as u64) as usize)
    }
}
