use anyhow::{Context, Result};
use callroom_server::{AppState, ServerConfig, SessionController, serve};
use clap::Parser;
use colored::*;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "callroom", version, about = "Signaling relay for multi-party WebRTC calls")]
struct Cli {
    /// Address for the HTTP/WebSocket listener.
    #[arg(long, env = "CALLROOM_BIND_ADDR")]
    bind: Option<SocketAddr>,

    /// Port override; keeps the host part of the bind address.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log filter, e.g. `info` or `callroom_server=debug`. `RUST_LOG` wins if set.
    #[arg(long, env = "CALLROOM_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::default();
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        config.log_level = self.log_level;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config();
    init_tracing(&config.log_level)?;

    info!("Initializing signaling relay...");

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    println!(
        "{}",
        format!("callroom listening on {}", listener.local_addr()?)
            .green()
            .bold()
    );

    let state = AppState::new(SessionController::new());
    serve(listener, state, shutdown_signal())
        .await
        .context("Server terminated with an error")?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
