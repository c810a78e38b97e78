/// Errors from storage backend operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected or failed an operation.
    #[error("operation failed: {0}")]
    Backend(String),

    /// A document could not be converted to or from the backend format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The backend could not be reached at startup.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
