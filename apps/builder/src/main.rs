mod config;
mod delivery;
mod errors;
mod generation_client;
mod models;
mod routes;
mod state;
mod wizard;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::delivery::FileSystemDelivery;
use crate::generation_client::HttpGenerationClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::wizard::sessions::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume builder v{}", env!("CARGO_PKG_VERSION"));

    let generator = HttpGenerationClient::new(
        config.generation_service_url.clone(),
        config.min_artifact_bytes,
    )?;
    info!("Generation client initialized (endpoint: {})", generator.endpoint());

    let delivery = FileSystemDelivery::new(config.download_dir.clone());
    info!("Artifacts will be saved to {}", delivery.dir().display());

    let state = AppState {
        config: config.clone(),
        sessions: SessionStore::default(),
        generator: Arc::new(generator),
        delivery: Arc::new(delivery),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
