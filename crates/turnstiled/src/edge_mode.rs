//! Edge mode — stateless router and content API.
//!
//! Holds no counter of its own; every routing decision goes to the remote
//! counter service. Any number of edge processes may run side by side.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use turnstile_api::ApiState;
use turnstile_core::TurnstileConfig;
use turnstile_router::{RemoteSequence, RoundRobinRouter};

/// Run an edge node.
pub async fn run_edge(config_path: &Path, port: u16, counter_url: &str) -> anyhow::Result<()> {
    info!("Turnstile daemon starting in edge mode");

    let config = TurnstileConfig::from_file(config_path)?;
    info!(path = ?config_path, "config loaded");

    let sequence = RemoteSequence::new(counter_url)?;
    info!(counter = sequence.address(), "using remote counter service");

    let router = RoundRobinRouter::new(&config.routing, Arc::new(sequence))?;
    crate::log_rotation(&router);

    let state = ApiState {
        routing: Some(Arc::new(router)),
        counters: None,
        content: Some(crate::load_corpus(&config)?),
    };
    crate::serve(turnstile_api::build_router(state), port).await?;

    info!("edge node stopped");
    Ok(())
}
