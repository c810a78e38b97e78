use std::future::Future;

use docstore_actor::{StoreActor, StoreHandle};
use docstore_store::{InMemoryBackend, MongoBackend, StoreBackend};
use docstore_types::{Document, DocumentKey};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{BackendConfig, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::handler::GatewayState;
use crate::router::build_router;

/// The document inserted by an in-memory store before it takes traffic.
pub fn seed_document() -> Document {
    let mut document = Document::new();
    document.insert("test", json!("oui"));
    document
}

/// Insert the seed document through the normal command path.
pub async fn seed_store<K: DocumentKey>(store: &StoreHandle<K>) -> ServerResult<Document> {
    Ok(store.insert(seed_document()).await?)
}

/// docstore HTTP server.
pub struct DocstoreServer {
    config: ServerConfig,
}

impl DocstoreServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Open the backend, start the store actor and serve until `shutdown`
    /// resolves. Backend connection, seeding and bind failures are returned
    /// before any request is accepted.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.config.validate()?;
        match self.config.backend.clone() {
            BackendConfig::Memory => {
                let seed = self.config.seed;
                self.run(InMemoryBackend::new(), seed, shutdown).await
            }
            BackendConfig::Mongo(mongo) => {
                let backend =
                    MongoBackend::connect(&mongo.host, &mongo.database, &mongo.collection).await?;
                self.run(backend, false, shutdown).await
            }
        }
    }

    async fn run<B, F>(self, backend: B, seed: bool, shutdown: F) -> ServerResult<()>
    where
        B: StoreBackend,
        F: Future<Output = ()> + Send + 'static,
    {
        let (store, actor) = StoreActor::spawn(backend, &self.config.actor_config());

        if seed {
            let seeded = seed_store(&store).await?;
            info!(id = seeded.id().unwrap_or_default(), "seeded store");
        }

        let app = build_router(&self.config.prefix, GatewayState::new(store));
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            "docstore listening on {}{}",
            listener.local_addr()?,
            self.config.prefix
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        let stats = actor
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        info!(commands = stats.total(), "docstore stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl-C, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MongoConfig;

    #[test]
    fn server_construction() {
        let server = DocstoreServer::new(ServerConfig::default());
        assert_eq!(server.config().prefix, "/json/");
    }

    #[test]
    fn seed_document_content() {
        assert_eq!(seed_document().into_value(), json!({"test": "oui"}));
    }

    #[tokio::test]
    async fn serves_and_stops_on_shutdown() {
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..ServerConfig::default()
        };
        DocstoreServer::new(config)
            .serve_with_shutdown(async {})
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_fatal() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ServerConfig {
            bind_addr: taken.local_addr().unwrap(),
            ..ServerConfig::default()
        };
        let err = DocstoreServer::new(config)
            .serve_with_shutdown(async {})
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Io(_)));
    }

    #[tokio::test]
    async fn invalid_config_is_fatal() {
        let config = ServerConfig {
            prefix: "json".into(),
            ..ServerConfig::default()
        };
        let err = DocstoreServer::new(config)
            .serve_with_shutdown(async {})
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[tokio::test]
    async fn unusable_mongo_address_is_fatal() {
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            backend: BackendConfig::Mongo(MongoConfig {
                host: "mongodb://localhost:notaport".into(),
                ..MongoConfig::default()
            }),
            ..ServerConfig::default()
        };
        let err = DocstoreServer::new(config)
            .serve_with_shutdown(async {})
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServerError::Store(docstore_store::StoreError::Connection(_))
        ));
    }
}
