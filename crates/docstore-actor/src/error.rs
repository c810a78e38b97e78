use std::time::Duration;

use docstore_store::StoreError;

/// Errors produced while building, sending or applying a command.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// A read or update was requested without a key.
    #[error("Missing id")]
    MissingKey,

    /// A write was requested without a document.
    #[error("Empty content")]
    EmptyContent,

    /// No document is stored under the key.
    #[error("Unknown id: '{0}'")]
    NotFound(String),

    /// The backend failed the operation. The actor keeps serving.
    #[error("Backend error: {0}")]
    Backend(#[from] StoreError),

    /// No reply arrived within the handle's deadline.
    #[error("Store did not reply within {0:?}")]
    Timeout(Duration),

    /// The actor has stopped and no longer accepts commands.
    #[error("Store is unavailable")]
    Closed,
}

impl ActorError {
    /// Errors caused by the request itself rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ActorError::MissingKey | ActorError::EmptyContent)
    }
}

/// Result alias for actor operations.
pub type ActorResult<T> = Result<T, ActorError>;
