use axum::{
    routing::{any, get},
    Router,
};
use docstore_types::DocumentKey;
use tower_http::trace::TraceLayer;

use crate::handler::{self, GatewayState};

/// Build the axum router: document endpoints under `prefix` plus `/health`.
///
/// `prefix` must start and end with `/` (see `ServerConfig::validate`).
pub fn build_router<K: DocumentKey>(prefix: &str, state: GatewayState<K>) -> Router {
    let keyed = format!("{prefix}:id");
    Router::new()
        .route("/health", get(handler::health_handler::<K>))
        .route(prefix, any(handler::collection_handler::<K>))
        .route(&keyed, any(handler::document_handler::<K>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
