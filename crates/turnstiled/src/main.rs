//! turnstiled — the Turnstile daemon.
//!
//! One binary, three process shapes:
//! - `serve`: counter store, router and content API in one process
//! - `counter`: only the durable counter service
//! - `edge`: router and content API, counter reached over HTTP
//!
//! # Usage
//!
//! ```text
//! turnstiled serve --config turnstile.toml --port 8080 --data-dir /var/lib/turnstile
//! turnstiled counter --port 9400 --data-dir /var/lib/turnstile
//! turnstiled edge --config turnstile.toml --port 8080 --counter-url http://10.0.0.5:9400
//! ```

mod counter_mode;
mod edge_mode;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use turnstile_api::ApiState;
use turnstile_core::{Corpus, TurnstileConfig};
use turnstile_router::{LocalSequence, RoundRobinRouter};
use turnstile_state::{CounterActor, CounterStore};

#[derive(Parser)]
#[command(name = "turnstiled", about = "Turnstile daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run everything in one process.
    Serve {
        /// Path to turnstile.toml.
        #[arg(long, default_value = "turnstile.toml")]
        config: PathBuf,

        /// Port to listen on.
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Data directory for the counter database.
        #[arg(long, default_value = "/var/lib/turnstile")]
        data_dir: PathBuf,
    },

    /// Run only the counter service.
    Counter {
        /// Port to listen on.
        #[arg(long, default_value = "9400")]
        port: u16,

        /// Data directory for the counter database.
        #[arg(long, default_value = "/var/lib/turnstile")]
        data_dir: PathBuf,
    },

    /// Run the router and content API against a remote counter service.
    Edge {
        /// Path to turnstile.toml.
        #[arg(long, default_value = "turnstile.toml")]
        config: PathBuf,

        /// Port to listen on.
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Base URL of the counter service.
        #[arg(long)]
        counter_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,turnstiled=debug,turnstile=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            data_dir,
        } => run_standalone(&config, port, &data_dir).await,
        Command::Counter { port, data_dir } => counter_mode::run_counter(port, &data_dir).await,
        Command::Edge {
            config,
            port,
            counter_url,
        } => edge_mode::run_edge(&config, port, &counter_url).await,
    }
}

async fn run_standalone(config_path: &Path, port: u16, data_dir: &Path) -> anyhow::Result<()> {
    info!("Turnstile daemon starting in standalone mode");

    let config = TurnstileConfig::from_file(config_path)?;
    info!(path = ?config_path, "config loaded");

    let store = open_store(data_dir)?;
    let (counters, actor_task) = CounterActor::spawn(store);
    info!("counter actor started");

    let sequence = Arc::new(LocalSequence::new(counters.clone()));
    let router = RoundRobinRouter::new(&config.routing, sequence)?;
    log_rotation(&router);

    let state = ApiState {
        routing: Some(Arc::new(router)),
        counters: Some(counters),
        content: Some(load_corpus(&config)?),
    };

    serve(turnstile_api::build_router(state), port).await?;

    // The router is gone with the server; the actor exits once its last
    // handle is dropped.
    let _ = actor_task.await;
    info!("Turnstile daemon stopped");
    Ok(())
}

/// Open the counter database under `data_dir`, creating the directory.
pub(crate) fn open_store(data_dir: &Path) -> anyhow::Result<CounterStore> {
    std::fs::create_dir_all(data_dir)?;
    let db_path = data_dir.join("counters.redb");
    let store = CounterStore::open(&db_path)?;
    let counters = store.list()?;
    for (name, value) in &counters {
        debug!(counter = %name, value, "counter restored");
    }
    info!(path = ?db_path, counters = counters.len(), "counter store opened");
    Ok(store)
}

/// Log the channel rotation a router will serve.
pub(crate) fn log_rotation(router: &RoundRobinRouter) {
    for (index, phone) in router.channels().iter().enumerate() {
        debug!(index, %phone, "channel");
    }
    info!(channels = router.channels().len(), "router ready");
}

/// Load the configured corpus, or an empty one if none is configured.
pub(crate) fn load_corpus(config: &TurnstileConfig) -> anyhow::Result<Corpus> {
    let Some(content) = &config.content else {
        warn!("no [content] section configured; content endpoints will report an empty corpus");
        return Ok(Corpus::default());
    };
    let corpus = Corpus::from_json_file(&content.corpus_path)?;
    if corpus.is_empty() {
        warn!(path = ?content.corpus_path, "corpus is empty");
    }
    info!(path = ?content.corpus_path, records = corpus.len(), "corpus loaded");
    Ok(corpus)
}

/// Serve `router` on all interfaces until Ctrl-C.
pub(crate) async fn serve(router: Router, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for CTRL+C");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
