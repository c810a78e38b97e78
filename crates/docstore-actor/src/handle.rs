use std::time::Duration;

use docstore_types::{Document, DocumentKey};
use tokio::sync::{mpsc, oneshot};

use crate::command::{Command, Operation, Reply};
use crate::error::{ActorError, ActorResult};

/// Cloneable sending side of a store actor.
///
/// Each call enqueues one command and waits for its reply. The wait,
/// including time spent queueing behind other commands, is bounded by the
/// reply timeout. A command that was already queued when the deadline hit is
/// still applied; only its reply is lost.
#[derive(Debug)]
pub struct StoreHandle<K> {
    sender: mpsc::Sender<Command<K>>,
    reply_timeout: Duration,
    backend: &'static str,
}

impl<K> Clone for StoreHandle<K> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            reply_timeout: self.reply_timeout,
            backend: self.backend,
        }
    }
}

impl<K: DocumentKey> StoreHandle<K> {
    pub(crate) fn new(
        sender: mpsc::Sender<Command<K>>,
        reply_timeout: Duration,
        backend: &'static str,
    ) -> Self {
        Self {
            sender,
            reply_timeout,
            backend,
        }
    }

    /// Name of the backend behind the actor.
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Enqueue an operation without waiting for its reply.
    ///
    /// Commands submitted from one task are applied in submission order.
    pub async fn submit(&self, op: Operation<K>) -> ActorResult<oneshot::Receiver<Reply>> {
        let (command, rx) = Command::new(op);
        self.sender
            .send(command)
            .await
            .map_err(|_| ActorError::Closed)?;
        Ok(rx)
    }

    /// Enqueue an operation and wait for its reply.
    pub async fn execute(&self, op: Operation<K>) -> ActorResult<Document> {
        let exchange = async {
            let rx = self.submit(op).await?;
            rx.await.map_err(|_| ActorError::Closed)?
        };
        tokio::time::timeout(self.reply_timeout, exchange)
            .await
            .map_err(|_| ActorError::Timeout(self.reply_timeout))?
    }

    pub async fn insert(&self, document: Document) -> ActorResult<Document> {
        self.execute(Operation::Insert(document)).await
    }

    pub async fn select(&self, key: K) -> ActorResult<Document> {
        self.execute(Operation::Select(key)).await
    }

    pub async fn update(&self, key: K, document: Document) -> ActorResult<Document> {
        self.execute(Operation::Update(key, document)).await
    }
}
