use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("empty key")]
    EmptyKey,

    #[error("invalid key: '{0}'")]
    InvalidKey(String),

    #[error("document must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}
