mod config;
mod drill;
mod errors;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::render::{AssetLocator, DirAssetLocator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mathdrill API v{}", env!("CARGO_PKG_VERSION"));

    // Decorative images; worksheets render without them if the directory is absent
    let locator = DirAssetLocator::new(&config.assets_dir);
    if !locator.root().is_dir() {
        warn!(
            "Assets directory {} not found; worksheets will have no images",
            locator.root().display()
        );
    }
    let assets: Arc<dyn AssetLocator> = Arc::new(locator);
    info!(
        "Answer sheet: {} rows per page, sampling capped at {} attempts",
        config.answer_rows_per_page, config.max_sampling_attempts
    );

    // Build app state
    let state = AppState::new(config.clone(), assets);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
