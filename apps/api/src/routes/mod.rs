pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ranking::handlers as ranking;
use crate::search::handlers as search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job listing and detail
        .route("/api/v1/jobs", get(search::handle_search_jobs))
        .route("/api/v1/jobs/:id", get(ranking::handle_job_detail))
        // Prediction
        .route("/api/v1/predict", post(ranking::handle_predict))
        .route("/api/v1/predict/auto", post(ranking::handle_predict_auto))
        .route("/api/v1/model", get(ranking::handle_model_info))
        .route("/api/v1/stats", get(health::stats_handler))
        .with_state(state)
}
