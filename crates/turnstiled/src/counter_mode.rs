//! Counter mode — runs only the durable counter service.
//!
//! Edge processes reach it at `POST /internal/counters/{name}/increment`.

use std::path::Path;

use tracing::info;

use turnstile_api::ApiState;
use turnstile_state::CounterActor;

/// Run the counter service node.
pub async fn run_counter(port: u16, data_dir: &Path) -> anyhow::Result<()> {
    info!("Turnstile daemon starting in counter mode");

    let store = crate::open_store(data_dir)?;
    let (counters, actor_task) = CounterActor::spawn(store);

    let state = ApiState {
        counters: Some(counters),
        ..Default::default()
    };
    crate::serve(turnstile_api::build_router(state), port).await?;

    let _ = actor_task.await;
    info!("counter service stopped");
    Ok(())
}
