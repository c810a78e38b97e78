use std::fmt;

use docstore_types::{Document, DocumentKey};
use tokio::sync::oneshot;

use crate::error::{ActorError, ActorResult};

/// What the actor sends back for every command.
pub type Reply = ActorResult<Document>;

/// Whether a request wants to write a document or read one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Write,
    Read,
}

/// A request against the document table.
///
/// The set is closed: the actor matches it exhaustively. Every variant
/// carries exactly what it needs, so a command the actor receives is always
/// complete.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation<K> {
    /// Store a new document under a generated key.
    Insert(Document),
    /// Read the document stored under a key.
    Select(K),
    /// Replace (or create) the document under a caller-supplied key.
    Update(K, Document),
}

impl<K: DocumentKey> Operation<K> {
    /// Build an operation from the loose shape of an incoming request.
    ///
    /// A write without a key is an insert; a write with a key is an update.
    /// A read needs a key. A write without content is rejected. These checks
    /// run before anything is queued, so the table is never touched by an
    /// incomplete request.
    pub fn from_request(
        intent: Intent,
        key: Option<K>,
        content: Option<Document>,
    ) -> ActorResult<Self> {
        match intent {
            Intent::Write => {
                let content = content.ok_or(ActorError::EmptyContent)?;
                Ok(match key {
                    None => Operation::Insert(content),
                    Some(key) => Operation::Update(key, content),
                })
            }
            Intent::Read => key.map(Operation::Select).ok_or(ActorError::MissingKey),
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Insert(_) => OperationKind::Insert,
            Operation::Select(_) => OperationKind::Select,
            Operation::Update(..) => OperationKind::Update,
        }
    }
}

/// Discriminant of an [`Operation`], for logging and statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Insert,
    Select,
    Update,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Insert => "insert",
            OperationKind::Select => "select",
            OperationKind::Update => "update",
        })
    }
}

/// An operation paired with its single-use reply channel.
#[derive(Debug)]
pub struct Command<K> {
    pub op: Operation<K>,
    pub reply: oneshot::Sender<Reply>,
}

impl<K> Command<K> {
    /// Create a command and the receiver its reply will arrive on.
    pub fn new(op: Operation<K>) -> (Self, oneshot::Receiver<Reply>) {
        let (reply, rx) = oneshot::channel();
        (Self { op, reply }, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstore_types::TextKey;
    use serde_json::json;

    fn key(raw: &str) -> TextKey {
        raw.parse().unwrap()
    }

    fn doc() -> Document {
        Document::from_value(json!({"test": "oui"})).unwrap()
    }

    #[test]
    fn write_without_key_is_insert() {
        let op = Operation::<TextKey>::from_request(Intent::Write, None, Some(doc())).unwrap();
        assert_eq!(op, Operation::Insert(doc()));
        assert_eq!(op.kind(), OperationKind::Insert);
    }

    #[test]
    fn write_with_key_is_update() {
        let op = Operation::from_request(Intent::Write, Some(key("7")), Some(doc())).unwrap();
        assert_eq!(op, Operation::Update(key("7"), doc()));
    }

    #[test]
    fn read_with_key_is_select() {
        let op = Operation::from_request(Intent::Read, Some(key("7")), None).unwrap();
        assert_eq!(op, Operation::Select(key("7")));
    }

    #[test]
    fn read_ignores_content() {
        let op = Operation::from_request(Intent::Read, Some(key("7")), Some(doc())).unwrap();
        assert_eq!(op.kind(), OperationKind::Select);
    }

    #[test]
    fn read_without_key_is_rejected() {
        let err = Operation::<TextKey>::from_request(Intent::Read, None, None).unwrap_err();
        assert!(matches!(err, ActorError::MissingKey));
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Missing id");
    }

    #[test]
    fn write_without_content_is_rejected() {
        let err = Operation::from_request(Intent::Write, Some(key("7")), None).unwrap_err();
        assert!(matches!(err, ActorError::EmptyContent));
        assert_eq!(err.to_string(), "Empty content");
    }

    #[test]
    fn kind_display() {
        assert_eq!(OperationKind::Update.to_string(), "update");
    }

    #[tokio::test]
    async fn command_reply_reaches_receiver() {
        let (command, rx) = Command::new(Operation::Select(key("0")));
        command.reply.send(Ok(doc())).unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), doc());
    }
}
