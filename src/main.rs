//! kbroker - Kafka wire-protocol broker
//!
//! Answers ApiVersions and DescribeTopicPartitions requests over TCP.

use clap::Parser;
use kbroker_server::{Config, Server, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kbroker", version, about = "Kafka wire-protocol broker")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "KBROKER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config and KBROKER_BIND)
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        // An explicitly named config file must load.
        Some(path) => match Config::load_from(path) {
            Ok(c) => {
                tracing::info!("Loaded config from {}", path.display());
                c
            }
            Err(e) => {
                tracing::error!("Failed to load config: {}", e);
                return Err(e.into());
            }
        },
        None => match Config::load() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Invalid environment configuration: {}", e);
                tracing::info!("Using default configuration");
                Config::default()
            }
        },
    };

    if let Some(bind) = args.bind {
        config.network.bind_addr = bind;
    }

    tracing::info!("Starting kbroker");
    tracing::info!("  Bind address: {}", config.network.bind_addr);
    tracing::info!("  Max connections: {}", config.network.max_connections);
    tracing::info!("  Idle timeout: {}s", config.network.idle_timeout_secs);
    if config.debug.dump_frames {
        tracing::info!("  Frame dumps: enabled (trace level)");
    }

    let server = Arc::new(Server::new(ServerConfig::from_config(&config)));

    let shutdown_server = server.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal, stopping server...");
        shutdown_server.shutdown();
    });

    server.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
