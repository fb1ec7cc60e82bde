//! Organization management server
//!
//! Binds the HTTP API over the lifecycle core with an in-memory storage
//! backend. Swappable persistent backends plug in behind the storage driver
//! trait without touching this binary.

use anyhow::Result;
use chrono::Duration;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orgbase_api::{ApiServer, ApiServerConfig};
use orgbase_auth::TokenService;
use orgbase_control::LifecycleManager;
use orgbase_store::MemoryStore;

/// Organization management server
#[derive(Parser, Debug)]
#[command(name = "orgbase-server")]
#[command(about = "Run the organization management API server", long_about = None)]
#[command(version)]
struct Args {
    /// API server bind address
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind_addr: SocketAddr,

    /// Secret for signing access tokens
    /// Can also be set via the ORGBASE_JWT_SECRET environment variable
    #[arg(long, env = "ORGBASE_JWT_SECRET")]
    jwt_secret: String,

    /// Access token validity in minutes
    #[arg(long, default_value = "30")]
    token_ttl_minutes: i64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting organization management server");

    let store = Arc::new(MemoryStore::new());
    let manager = Arc::new(LifecycleManager::new(store));
    manager.bootstrap().await?;

    let tokens = Arc::new(TokenService::new(
        args.jwt_secret.as_bytes(),
        Duration::minutes(args.token_ttl_minutes),
    ));

    let config = ApiServerConfig {
        bind_addr: args.bind_addr,
        enable_cors: !args.no_cors,
    };

    let server = ApiServer::new(config, manager, tokens);

    tokio::select! {
        result = server.start() => result?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping server");
        }
    }

    Ok(())
}
