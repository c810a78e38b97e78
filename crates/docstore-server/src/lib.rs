//! HTTP gateway for docstore.
//!
//! Translates `POST`/`GET` requests under a path prefix into store-actor
//! commands, waits for the reply and renders it as JSON. The gateway never
//! reads or writes the table itself.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{BackendConfig, MongoConfig, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::GatewayState;
pub use router::build_router;
pub use server::{seed_document, seed_store, DocstoreServer};
