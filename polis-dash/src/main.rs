//! polis-dash - Pol.is report dashboard
//!
//! Serves a browser UI: paste a Pol.is report URL, run the statements
//! recipe, explore the resulting statement map.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use polis_common::config::ConfigResolver;
use polis_dash::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for polis-dash
#[derive(Parser, Debug)]
#[command(name = "polis-dash")]
#[command(about = "Pol.is report dashboard")]
#[command(version)]
struct Args {
    /// Config file (overrides POLIS_DASH_CONFIG and the per-user file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "POLIS_DASH_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is resolved before tracing so its log level can seed the filter;
    // resolution messages emitted before init are dropped.
    let mut config = ConfigResolver::new(args.config.clone()).load();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("polis_dash={0},polis_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting Polis Dashboard (polis-dash) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        "Plot backend: {:?}, translation {}",
        config.plot_backend,
        if config.translation_enabled { "enabled" } else { "disabled" }
    );

    let addr = format!("{}:{}", config.bind_address, config.port);
    let state = AppState::with_polis_client(config).context("Failed to create Pol.is client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("polis-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("polis-dash stopped");
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl-C, shutting down");
    }
}
