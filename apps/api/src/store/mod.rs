//! Backend Selector: one read contract, two implementations.
//!
//! The primary store is probed once at startup. When it is unavailable every
//! read is answered by the in-memory snapshot for the life of the process.
//! A primary read that fails at runtime is logged and answered from the
//! snapshot; nothing is retried and the probe is not repeated.

pub mod postgres;
pub mod snapshot;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{create_pool, probe};
use crate::models::{Candidate, JobPosting};
use crate::search::{SearchPage, SearchQuery};

pub use postgres::PgStore;
pub use snapshot::SnapshotStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Primary,
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_jobs: i64,
    pub jobs_with_applications: i64,
    pub total_candidates: i64,
}

/// The read contract both backends satisfy.
#[async_trait]
pub trait JobStore: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn search_jobs(&self, query: &SearchQuery) -> Result<SearchPage>;

    async fn find_job(&self, id: &str) -> Result<Option<JobPosting>>;

    /// All candidates, in the store's iteration order.
    async fn list_candidates(&self) -> Result<Vec<Candidate>>;

    async fn stats(&self) -> Result<StoreStats>;
}

/// Connects to and probes the primary store. `None` means every read for the
/// life of the process goes to the snapshot.
pub async fn connect_primary(config: &Config) -> Option<Arc<dyn JobStore>> {
    let Some(url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set; serving all reads from the snapshot");
        return None;
    };

    let pool = match create_pool(url, config.db_acquire_timeout).await {
        Ok(pool) => pool,
        Err(e) => {
            warn!(error = %e, "Primary store unavailable; serving all reads from the snapshot");
            return None;
        }
    };

    if let Err(e) = probe(&pool).await {
        warn!(error = %e, "Primary store probe failed; serving all reads from the snapshot");
        return None;
    }

    info!("Primary store available");
    Some(Arc::new(PgStore::new(pool)))
}

/// Routes each read to the primary store when it is available, else to the
/// snapshot. Cheap to clone.
#[derive(Clone)]
pub struct DataSource {
    primary: Option<Arc<dyn JobStore>>,
    fallback: Arc<SnapshotStore>,
}

impl DataSource {
    pub fn new(primary: Option<Arc<dyn JobStore>>, fallback: Arc<SnapshotStore>) -> Self {
        Self { primary, fallback }
    }

    pub fn primary_available(&self) -> bool {
        self.primary.is_some()
    }

    /// The backend that answers reads when nothing fails.
    pub fn active_backend(&self) -> BackendKind {
        self.primary
            .as_ref()
            .map_or(BackendKind::Snapshot, |primary| primary.kind())
    }

    pub fn snapshot(&self) -> &SnapshotStore {
        &self.fallback
    }

    pub async fn search_jobs(&self, query: &SearchQuery) -> Result<SearchPage> {
        if let Some(primary) = &self.primary {
            match primary.search_jobs(query).await {
                Ok(page) => return Ok(page),
                Err(e) => degraded("search_jobs", &e),
            }
        }
        self.fallback.search_jobs(query).await
    }

    pub async fn find_job(&self, id: &str) -> Result<Option<JobPosting>> {
        if let Some(primary) = &self.primary {
            match primary.find_job(id).await {
                Ok(job) => return Ok(job),
                Err(e) => degraded("find_job", &e),
            }
        }
        self.fallback.find_job(id).await
    }

    pub async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        if let Some(primary) = &self.primary {
            match primary.list_candidates().await {
                Ok(candidates) => return Ok(candidates),
                Err(e) => degraded("list_candidates", &e),
            }
        }
        self.fallback.list_candidates().await
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        if let Some(primary) = &self.primary {
            match primary.stats().await {
                Ok(stats) => return Ok(stats),
                Err(e) => degraded("stats", &e),
            }
        }
        self.fallback.stats().await
    }
}

fn degraded(operation: &'static str, error: &anyhow::Error) {
    warn!(operation, error = %error, "Primary store read failed; answering from the snapshot");
}
