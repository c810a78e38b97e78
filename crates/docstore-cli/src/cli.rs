use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use docstore_server::{BackendConfig, MongoConfig, ServerConfig};

#[derive(Parser)]
#[command(
    name = "docstore",
    about = "docstore: JSON documents over HTTP",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the effective configuration as TOML
    Config(ServeArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    Memory,
    Mongo,
}

/// Server settings. Flags override the config file, which overrides defaults.
#[derive(Args, Clone, Debug, Default)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[arg(long)]
    pub prefix: Option<String>,
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,
    #[arg(long)]
    pub mongo_host: Option<String>,
    #[arg(long)]
    pub database: Option<String>,
    #[arg(long)]
    pub collection: Option<String>,
    /// Do not insert the startup document
    #[arg(long)]
    pub no_seed: bool,
    #[arg(long)]
    pub reply_timeout_ms: Option<u64>,
    #[arg(long)]
    pub queue_capacity: Option<usize>,
}

impl ServeArgs {
    pub fn resolve(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(ms) = self.reply_timeout_ms {
            config.reply_timeout_ms = ms;
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = capacity;
        }
        if self.no_seed {
            config.seed = false;
        }

        let file_backend_is_memory = matches!(config.backend, BackendConfig::Memory);
        match self.backend {
            Some(BackendKind::Memory) => config.backend = BackendConfig::Memory,
            Some(BackendKind::Mongo) if file_backend_is_memory => {
                config.backend = BackendConfig::Mongo(MongoConfig::default())
            }
            _ => {}
        }

        let mongo_flags = self.mongo_host.is_some()
            || self.database.is_some()
            || self.collection.is_some();
        match &mut config.backend {
            BackendConfig::Mongo(mongo) => {
                if let Some(host) = &self.mongo_host {
                    mongo.host = host.clone();
                }
                if let Some(database) = &self.database {
                    mongo.database = database.clone();
                }
                if let Some(collection) = &self.collection {
                    mongo.collection = collection.clone();
                }
            }
            BackendConfig::Memory if mongo_flags => {
                bail!("--mongo-host, --database and --collection need the mongo backend")
            }
            BackendConfig::Memory => {}
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Serve(args) => args,
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parse_serve_defaults() {
        let config = serve_args(&["docstore", "serve"]).resolve().unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn parse_serve_bind() {
        let args = serve_args(&["docstore", "serve", "--bind", "127.0.0.1:9000"]);
        let config = args.resolve().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn parse_serve_mongo() {
        let args = serve_args(&[
            "docstore",
            "serve",
            "--backend",
            "mongo",
            "--mongo-host",
            "db:27017",
            "--collection",
            "docs",
        ]);
        let config = args.resolve().unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Mongo(MongoConfig {
                host: "db:27017".into(),
                database: "docstore".into(),
                collection: "docs".into(),
            })
        );
    }

    #[test]
    fn mongo_flags_without_mongo_backend_fail() {
        let args = serve_args(&["docstore", "serve", "--database", "x"]);
        assert!(args.resolve().is_err());
    }

    #[test]
    fn no_seed_flag() {
        let config = serve_args(&["docstore", "serve", "--no-seed"]).resolve().unwrap();
        assert!(!config.seed);
    }

    #[test]
    fn invalid_prefix_flag_fails() {
        let args = serve_args(&["docstore", "serve", "--prefix", "json"]);
        assert!(args.resolve().is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docstore.toml");
        std::fs::write(
            &path,
            "prefix = \"/docs/\"\n[backend]\nkind = \"mongo\"\ndatabase = \"prod\"\n",
        )
        .unwrap();

        let path_arg = path.to_str().unwrap();
        let args = serve_args(&[
            "docstore",
            "serve",
            "--config",
            path_arg,
            "--collection",
            "items",
        ]);
        let config = args.resolve().unwrap();
        assert_eq!(config.prefix, "/docs/");
        assert_eq!(
            config.backend,
            BackendConfig::Mongo(MongoConfig {
                host: "localhost:27017".into(),
                database: "prod".into(),
                collection: "items".into(),
            })
        );
    }

    #[test]
    fn backend_flag_overrides_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docstore.toml");
        std::fs::write(&path, "[backend]\nkind = \"mongo\"\n").unwrap();

        let path_arg = path.to_str().unwrap();
        let args = serve_args(&["docstore", "serve", "-c", path_arg, "--backend", "memory"]);
        assert_eq!(args.resolve().unwrap().backend, BackendConfig::Memory);
    }

    #[test]
    fn parse_config_command() {
        let cli = Cli::try_parse_from(["docstore", "config", "--backend", "mongo"]).unwrap();
        assert!(matches!(cli.command, Command::Config(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["docstore", "--verbose", "serve"]).unwrap();
        assert!(cli.verbose);
    }
}
