mod api;
mod trafiklab;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::post};
use clap::Parser;
use pendla_core::{Engine, EngineConfig};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::trafiklab::TrafikLab;

#[derive(Parser)]
#[command(about = "Public transit journey planner over a Trafiklab GTFS feed")]
struct Cli {
    /// Address to serve on
    #[arg(long, default_value = "0.0.0.0:8000")]
    addr: SocketAddr,
    /// Trafiklab operator code
    #[arg(long, default_value = "skane")]
    operator: String,
    /// Directory the static feed is extracted into
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn env_key(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{name} must be set"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let static_key = env_key("TRAFIKLAB_STATIC_KEY")?;
    let realtime_key = env_key("TRAFIKLAB_REALTIME_KEY")?;

    let feed = Arc::new(TrafikLab::new(
        &cli.operator,
        &static_key,
        &realtime_key,
        cli.data_dir.clone(),
    )?);
    let config = EngineConfig { data_dir: cli.data_dir, ..EngineConfig::default() };

    info!(operator = %cli.operator, "building initial timetable index");
    // the engine bootstraps with blocking network and disk I/O
    let engine = tokio::task::spawn_blocking(move || Engine::start(feed, config)).await??;
    let engine = Arc::new(engine);

    let app = Router::new()
        .route("/search", post(api::search))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)));

    let listener = tokio::net::TcpListener::bind(cli.addr).await?;
    info!(addr = %cli.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
