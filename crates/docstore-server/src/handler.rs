use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{Method, Uri};
use axum::response::Json;
use docstore_actor::{Intent, Operation, StoreHandle};
use docstore_types::{parse_key, Document, DocumentKey};
use serde_json::{json, Value};

use crate::error::ApiError;

/// Shared state of the document endpoints: the only way into the store.
pub struct GatewayState<K> {
    pub store: StoreHandle<K>,
}

impl<K> GatewayState<K> {
    pub fn new(store: StoreHandle<K>) -> Self {
        Self { store }
    }
}

impl<K> Clone for GatewayState<K> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

/// Health check handler.
pub async fn health_handler<K: DocumentKey>(
    State(state): State<GatewayState<K>>,
) -> Json<Value> {
    Json(json!({
        "status": if state.store.is_closed() { "unavailable" } else { "ok" },
        "backend": state.store.backend_name(),
    }))
}

/// `<prefix>`: insert on POST, otherwise a read with no id.
pub async fn collection_handler<K: DocumentKey>(
    State(state): State<GatewayState<K>>,
    method: Method,
    body: Bytes,
) -> Result<Json<Document>, ApiError> {
    dispatch(&state, &method, "", &body).await
}

/// `<prefix><id>`: update on POST, select otherwise.
pub async fn document_handler<K: DocumentKey>(
    State(state): State<GatewayState<K>>,
    method: Method,
    uri: Uri,
    segment: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<Document>, ApiError> {
    // A segment that does not decode (e.g. `%FF`) is reported in its raw form.
    let Path(segment) = segment.map_err(|_| {
        ApiError::invalid_key(uri.path().rsplit('/').next().unwrap_or_default())
    })?;
    dispatch(&state, &method, &segment, &body).await
}

async fn dispatch<K: DocumentKey>(
    state: &GatewayState<K>,
    method: &Method,
    segment: &str,
    body: &[u8],
) -> Result<Json<Document>, ApiError> {
    let key = parse_key::<K>(segment).map_err(|_| ApiError::invalid_key(segment))?;
    let intent = if *method == Method::POST {
        Intent::Write
    } else {
        Intent::Read
    };
    let content = match intent {
        Intent::Write => parse_body(body)?,
        Intent::Read => None,
    };
    let op = Operation::from_request(intent, key, content)?;
    let document = state.store.execute(op).await?;
    Ok(Json(document))
}

/// A JSON object, or `None` for a literal `null`.
fn parse_body(body: &[u8]) -> Result<Option<Document>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Document::from_value(value)
            .map(Some)
            .map_err(|_| ApiError::unparseable_body()),
        Err(_) => Err(ApiError::unparseable_body()),
    }
}
