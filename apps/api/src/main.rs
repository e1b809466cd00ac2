mod config;
mod db;
mod errors;
mod models;
mod normalize;
mod ranking;
mod routes;
mod scoring;
mod search;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ClassifierKind, Config};
use crate::routes::build_router;
use crate::scoring::{Classifier, HeuristicClassifier};
use crate::state::AppState;
use crate::store::{connect_primary, DataSource, SnapshotStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talent API v{}", env!("CARGO_PKG_VERSION"));

    // Snapshot is always loaded; it backs every read when the primary is down
    let snapshot = SnapshotStore::load(&config.data_dir)
        .with_context(|| format!("Failed to load snapshot from {}", config.data_dir.display()))?;

    // Probe the primary store once
    let primary = connect_primary(&config).await;
    let data = DataSource::new(primary, Arc::new(snapshot));

    let classifier: Option<Arc<dyn Classifier>> = match config.classifier {
        ClassifierKind::Heuristic => Some(Arc::new(HeuristicClassifier::new(config.feature_mode))),
        ClassifierKind::Disabled => None,
    };
    match &classifier {
        Some(c) => info!("Classifier: {} ({} features)", c.name(), c.feature_mode()),
        None => warn!("No classifier configured; ranking and prediction will answer 503"),
    }

    // Build app state
    let state = AppState {
        data,
        config: config.clone(),
        classifier,
    };

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
