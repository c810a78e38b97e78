use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use docstore_actor::ActorError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] docstore_store::StoreError),

    #[error("store actor error: {0}")]
    Actor(#[from] ActorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Error answer of a document endpoint, rendered as `{"error": message}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unparseable_body() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Can't parse body")
    }

    pub fn invalid_key(raw: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("Invalid id: '{raw}'"))
    }
}

impl From<ActorError> for ApiError {
    fn from(err: ActorError) -> Self {
        let status = match &err {
            ActorError::Timeout(_) => {
                return Self::new(StatusCode::GATEWAY_TIMEOUT, "Store did not reply in time")
            }
            client if client.is_client_error() => StatusCode::BAD_REQUEST,
            ActorError::NotFound(_) => StatusCode::NOT_FOUND,
            ActorError::Closed => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
