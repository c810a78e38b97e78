use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use docstore_actor::ActorConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Path prefix of the document endpoints; starts and ends with `/`.
    pub prefix: String,
    pub reply_timeout_ms: u64,
    pub queue_capacity: usize,
    /// Insert the fixed startup document (in-memory backend only).
    pub seed: bool,
    pub backend: BackendConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            prefix: "/json/".into(),
            reply_timeout_ms: 5_000,
            queue_capacity: 1024,
            seed: true,
            backend: BackendConfig::Memory,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ServerResult<()> {
        if !self.prefix.starts_with('/') || !self.prefix.ends_with('/') {
            return Err(ServerError::Config(format!(
                "prefix must start and end with '/': {:?}",
                self.prefix
            )));
        }
        if self.prefix.contains(':') || self.prefix.contains('*') {
            return Err(ServerError::Config(format!(
                "prefix must not contain route patterns: {:?}",
                self.prefix
            )));
        }
        if self.queue_capacity == 0 {
            return Err(ServerError::Config("queue_capacity must be positive".into()));
        }
        if self.reply_timeout_ms == 0 {
            return Err(ServerError::Config("reply_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    pub fn actor_config(&self) -> ActorConfig {
        ActorConfig {
            queue_capacity: self.queue_capacity,
            reply_timeout: self.reply_timeout(),
        }
    }
}

/// Which table the store actor owns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    #[default]
    Memory,
    Mongo(MongoConfig),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    /// `host:port` or a full `mongodb://` URI.
    pub host: String,
    pub database: String,
    pub collection: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: "localhost:27017".into(),
            database: "docstore".into(),
            collection: "documents".into(),
        }
    }
}
