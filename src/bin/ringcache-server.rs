//! HTTP server fronting a ring cache.

use anyhow::{Context, Result};
use clap::Parser;
use ringcache::config::DEFAULT_BIND_ADDR;
use ringcache::{DistributedCache, HttpServer, Owner, ServerConfig, DEFAULT_VIRTUAL_NODES};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ringcache-server")]
#[command(about = "Serve a consistent-hashing cache over HTTP")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = DEFAULT_BIND_ADDR, env = "RINGCACHE_BIND")]
    bind: String,

    /// Owner to attach at startup. Repeat for several; defaults to node0..node2.
    #[arg(long = "owner")]
    owners: Vec<String>,

    /// Ring positions per owner.
    #[arg(long, default_value_t = DEFAULT_VIRTUAL_NODES)]
    virtual_nodes: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ringcache=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::new(ServerConfig::parse_bind_addr(&cli.bind)?)
        .with_virtual_nodes(cli.virtual_nodes);
    if !cli.owners.is_empty() {
        config = config.with_initial_owners(cli.owners);
    }
    config.validate().context("invalid server configuration")?;

    let owners = config
        .initial_owners
        .iter()
        .map(Owner::new)
        .collect::<ringcache::Result<Vec<_>>>()?;
    let cache = Arc::new(DistributedCache::with_owners(config.cache.clone(), owners)?);

    let (server, shutdown_tx) = HttpServer::new(&config, cache);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            let _ = shutdown_tx.send(()).await;
        }
    });

    server.run().await.context("HTTP server failed")?;
    Ok(())
}
