//! Single-owner counter actor.
//!
//! All increments for every counter name flow through one mailbox and are
//! applied strictly one at a time. The reply for a message is sent only
//! after its redb transaction has committed.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{StateError, StateResult};
use crate::store::CounterStore;

/// Mailbox depth before senders start waiting.
const MAILBOX_CAPACITY: usize = 1024;

enum CounterCommand {
    IncrementAndFetch {
        name: String,
        reply: oneshot::Sender<StateResult<u64>>,
    },
    Peek {
        name: String,
        reply: oneshot::Sender<StateResult<u64>>,
    },
}

/// Owns the store and drains the mailbox.
pub struct CounterActor {
    store: CounterStore,
    inbox: mpsc::Receiver<CounterCommand>,
}

impl CounterActor {
    /// Spawn the actor on the current tokio runtime.
    ///
    /// The actor exits once every [`CounterHandle`] has been dropped.
    pub fn spawn(store: CounterStore) -> (CounterHandle, JoinHandle<()>) {
        let (tx, inbox) = mpsc::channel(MAILBOX_CAPACITY);
        let actor = Self { store, inbox };
        let task = tokio::spawn(actor.run());
        (CounterHandle { tx }, task)
    }

    async fn run(mut self) {
        info!("counter actor started");
        while let Some(cmd) = self.inbox.recv().await {
            match cmd {
                CounterCommand::IncrementAndFetch { name, reply } => {
                    let store = self.store.clone();
                    let result = run_blocking(move || store.increment_and_fetch(&name)).await;
                    if let Err(e) = &result {
                        error!(error = %e, "counter increment failed");
                    }
                    // The caller may have timed out and gone away; the
                    // increment stays committed either way.
                    if reply.send(result).is_err() {
                        debug!("counter reply dropped by caller");
                    }
                }
                CounterCommand::Peek { name, reply } => {
                    let store = self.store.clone();
                    let result = run_blocking(move || store.peek(&name)).await;
                    if reply.send(result).is_err() {
                        debug!("counter peek reply dropped by caller");
                    }
                }
            }
        }
        info!("counter actor stopped");
    }
}

/// redb commits fsync; keep them off the async worker threads.
async fn run_blocking<F>(f: F) -> StateResult<u64>
where
    F: FnOnce() -> StateResult<u64> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StateError::Unavailable(format!("counter task failed: {e}")))?
}

/// Cloneable client of a running [`CounterActor`].
#[derive(Clone)]
pub struct CounterHandle {
    tx: mpsc::Sender<CounterCommand>,
}

impl CounterHandle {
    /// Enqueue an increment and wait for the committed pre-increment value.
    pub async fn increment_and_fetch(&self, name: &str) -> StateResult<u64> {
        let (reply, rx) = oneshot::channel();
        self.send(CounterCommand::IncrementAndFetch {
            name: name.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| closed())?
    }

    /// Read a counter without incrementing it.
    pub async fn peek(&self, name: &str) -> StateResult<u64> {
        let (reply, rx) = oneshot::channel();
        self.send(CounterCommand::Peek {
            name: name.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| closed())?
    }

    async fn send(&self, cmd: CounterCommand) -> StateResult<()> {
        self.tx.send(cmd).await.map_err(|_| closed())
    }
}

fn closed() -> StateError {
    StateError::Unavailable("counter actor is not running".to_string())
}
