use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::scoring::Classifier;
use crate::store::DataSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Primary store with snapshot fallback, decided once at startup.
    pub data: DataSource,
    pub config: Config,
    /// Pluggable classifier. `None` when `CLASSIFIER=none`.
    pub classifier: Option<Arc<dyn Classifier>>,
}

impl AppState {
    pub fn classifier(&self) -> Result<Arc<dyn Classifier>, AppError> {
        self.classifier
            .clone()
            .ok_or_else(|| AppError::ServiceUnavailable("Classifier not loaded".to_string()))
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }
}
