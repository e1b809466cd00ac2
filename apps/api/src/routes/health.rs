use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::store::{BackendKind, StoreStats};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SnapshotInfo {
    pub jobs: usize,
    pub candidates: usize,
    pub applications: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    pub primary_available: bool,
    pub backend: BackendKind,
    pub snapshot: SnapshotInfo,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: StoreStats,
    pub model_loaded: bool,
    pub primary_available: bool,
}

/// GET /health
/// Service status, which backend is serving reads and what the snapshot holds.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.data.snapshot();
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.model_loaded(),
        primary_available: state.data.primary_available(),
        backend: state.data.active_backend(),
        snapshot: SnapshotInfo {
            jobs: snapshot.jobs().len(),
            candidates: snapshot.candidates().len(),
            applications: snapshot.applications().len(),
            loaded_at: snapshot.loaded_at(),
        },
    })
}

/// GET /api/v1/stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.data.stats().await?;
    Ok(Json(StatsResponse {
        stats,
        model_loaded: state.model_loaded(),
        primary_available: state.data.primary_available(),
    }))
}
