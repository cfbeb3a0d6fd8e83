//! HTTP server command
//!
//! Opens the configured store, verifies it is reachable, then serves the
//! REST API until Ctrl+C / SIGTERM.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;
use todoctl_core::{open_store, StoreConfig};
use todoctl_server::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Interface to bind to
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: SocketAddr::new(self.host, self.port),
            cors_permissive: self.cors_permissive,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, store_config: &StoreConfig) -> Result<()> {
    let config = args.server_config();
    tracing::info!(
        store = %store_config.describe(),
        "Starting todoctl server on {}",
        config.bind_addr
    );

    // A store that cannot be reached is fatal before the listener binds
    let store = open_store(store_config)
        .await
        .with_context(|| format!("Failed to open store {}", store_config.describe()))?;

    // Run server (blocks until shutdown)
    run_server(store, config).await.context("Server error")?;

    Ok(())
}
