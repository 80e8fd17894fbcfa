use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod batch;
mod config;
mod network;

use crate::app::{AppState, router};
use crate::config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "walkshed-server", version, about = "Walking isochrones over street networks")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve isochrones over HTTP
    Serve {
        /// Overrides `http.bind` from the configuration
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Compute isochrones for a GeoJSON file of points
    Batch {
        #[arg(long)]
        points: PathBuf,
        /// Property holding the point identifier
        #[arg(long, default_value = "id")]
        id_field: String,
        #[arg(long)]
        output: PathBuf,
        /// Skip clipping even if a boundary is configured
        #[arg(long)]
        no_clip: bool,
        /// Keep only the last point listed at each location
        #[arg(long)]
        dedup_locations: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?;
    let graph = network::load_street_graph(&config)?;
    let clip = network::load_clip_boundary(&config)?;

    match cli.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or(config.http.bind);
            let state = Arc::new(AppState::new(graph, clip, config.isochrones.clone()));
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(serve(state, &config, addr))
        }
        Command::Batch {
            points,
            id_field,
            output,
            no_clip,
            dedup_locations,
        } => {
            let clip = if no_clip { None } else { clip };
            let input = batch::PointsInput {
                path: &points,
                id_field: &id_field,
                dedup_locations,
            };
            batch::run_batch(&graph, clip, &config.isochrones, input, &output)
        }
    }
}

async fn serve(state: Arc<AppState>, config: &ServerConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state, &config.http);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
