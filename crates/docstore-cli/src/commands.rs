use colored::Colorize;
use docstore_server::{BackendConfig, DocstoreServer, ServerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    tracing::debug!(?config, "resolved configuration");
    print_banner(&config);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(DocstoreServer::new(config).serve())?;
    println!("{} docstore stopped.", "✓".green());
    Ok(())
}

fn cmd_config(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    print!("{}", config.to_toml()?);
    Ok(())
}

fn print_banner(config: &ServerConfig) {
    let backend = match &config.backend {
        BackendConfig::Memory => "memory".to_string(),
        BackendConfig::Mongo(mongo) => {
            format!("mongo {}/{}.{}", mongo.host, mongo.database, mongo.collection)
        }
    };
    println!(
        "{} docstore on {}{}",
        "▶".green().bold(),
        config.bind_addr.to_string().bold(),
        config.prefix.yellow()
    );
    println!("  Backend: {}", backend.cyan());
    println!("  Reply timeout: {} ms", config.reply_timeout_ms);
}
