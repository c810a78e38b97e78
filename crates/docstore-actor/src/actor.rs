use std::time::Duration;

use docstore_store::StoreBackend;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::command::{Command, Operation, OperationKind, Reply};
use crate::error::ActorError;
use crate::handle::StoreHandle;

/// Configuration for a [`StoreActor`].
#[derive(Clone, Debug)]
pub struct ActorConfig {
    /// Capacity of the inbound command queue. Senders wait when it is full.
    pub queue_capacity: usize,
    /// Deadline callers apply to each command round trip.
    pub reply_timeout: Duration,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            reply_timeout: Duration::from_secs(5),
        }
    }
}

/// Counters kept by the command loop, returned when it stops.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActorStats {
    pub inserted: u64,
    pub selected: u64,
    pub updated: u64,
    /// Selects that found nothing.
    pub not_found: u64,
    /// Commands the backend failed.
    pub failed: u64,
    /// Replies nobody was waiting for any more.
    pub undelivered: u64,
}

impl ActorStats {
    fn record(&mut self, kind: OperationKind, reply: &Reply) {
        match reply {
            Ok(_) => match kind {
                OperationKind::Insert => self.inserted += 1,
                OperationKind::Select => self.selected += 1,
                OperationKind::Update => self.updated += 1,
            },
            Err(ActorError::NotFound(_)) => self.not_found += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Total number of commands applied.
    pub fn total(&self) -> u64 {
        self.inserted + self.selected + self.updated + self.not_found + self.failed
    }
}

/// The single writer that owns a storage backend.
///
/// Commands are applied strictly one after another in queue order, each to
/// completion, so every command observes all effects of the ones before it.
/// The loop runs until every [`StoreHandle`] has been dropped.
pub struct StoreActor<B: StoreBackend> {
    backend: B,
    inbox: mpsc::Receiver<Command<B::Key>>,
    stats: ActorStats,
}

impl<B: StoreBackend> StoreActor<B> {
    /// Create an actor and the first handle to it. Nothing runs until
    /// [`run`](Self::run) is polled.
    pub fn new(backend: B, config: &ActorConfig) -> (Self, StoreHandle<B::Key>) {
        let (sender, inbox) = mpsc::channel(config.queue_capacity.max(1));
        let handle = StoreHandle::new(sender, config.reply_timeout, backend.name());
        let actor = Self {
            backend,
            inbox,
            stats: ActorStats::default(),
        };
        (actor, handle)
    }

    /// Create an actor and run it on the current tokio runtime.
    pub fn spawn(backend: B, config: &ActorConfig) -> (StoreHandle<B::Key>, JoinHandle<ActorStats>) {
        let (actor, handle) = Self::new(backend, config);
        (handle, tokio::spawn(actor.run()))
    }

    /// Serve commands until all handles are gone.
    pub async fn run(mut self) -> ActorStats {
        info!(backend = self.backend.name(), "store actor started");
        while let Some(Command { op, reply }) = self.inbox.recv().await {
            let kind = op.kind();
            let outcome = self.apply(op).await;
            self.stats.record(kind, &outcome);
            if let Err(ActorError::Backend(err)) = &outcome {
                warn!(%kind, error = %err, "backend operation failed");
            }
            // oneshot sends never block; a caller that gave up just loses the reply.
            if reply.send(outcome).is_err() {
                self.stats.undelivered += 1;
                debug!(%kind, "caller went away before the reply");
            }
        }
        info!(backend = self.backend.name(), stats = ?self.stats, "store actor stopped");
        self.stats
    }

    async fn apply(&mut self, op: Operation<B::Key>) -> Reply {
        match op {
            Operation::Insert(mut document) => {
                let key = self.backend.generate_key();
                document.stamp_id(&key);
                self.backend.insert(&key, &document).await?;
                debug!(%key, "stored document");
                Ok(document)
            }
            Operation::Update(key, mut document) => {
                document.stamp_id(&key);
                self.backend.replace(&key, &document).await?;
                debug!(%key, "stored document");
                Ok(document)
            }
            Operation::Select(key) => match self.backend.fetch(&key).await? {
                Some(document) => Ok(document.with_id(&key)),
                None => Err(ActorError::NotFound(key.to_string())),
            },
        }
    }
}
