//! toolrelay server entry point

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use toolrelay_core::config::{load_env_file, ServiceConfig};
use toolrelay_core::{EnvSecretStore, TracingLogger};
use toolrelay_server::{create_router, AppState};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "toolrelay", version, about = "LLM completion service with remote tool calls")]
struct Args {
    /// YAML config file (overrides TOOLRELAY_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config and PORT)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Environment file loaded before anything else
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load before the subscriber so RUST_LOG from the file applies
    let env_report = load_env_file(&args.env_file)?;

    tracing_subscriber::registry()
        .with(fmt::layer().compact())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,toolrelay=debug")),
        )
        .init();

    match env_report {
        Some(report) => info!(
            "Loaded {} variables from {} ({} already set)",
            report.loaded.len(),
            args.env_file.display(),
            report.skipped.len()
        ),
        None => debug!("No environment file at {}", args.env_file.display()),
    }

    let mut config = ServiceConfig::load(args.config.as_deref(), &EnvSecretStore::new())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let state = AppState::from_config(&config, Arc::new(TracingLogger::new()))?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Tool endpoint: {}", config.mcp_server_url.as_deref().unwrap_or_default());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received terminate signal, shutting down..."),
    }
}
