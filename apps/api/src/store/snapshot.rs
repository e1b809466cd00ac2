//! Fallback snapshot: the whole data set loaded into memory once at startup
//! from the static JSON files.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::info;

use crate::models::{Application, Candidate, JobPosting};
use crate::normalize::{normalize_applications, normalize_candidates, normalize_jobs};
use crate::search::{
    has_applications, search_in_memory, tally_applications, ApplicationTally, SearchPage,
    SearchQuery,
};
use crate::store::{BackendKind, JobStore, StoreStats};

pub const JOBS_FILE: &str = "vagas.json";
pub const CANDIDATES_FILE: &str = "applicants.json";
pub const APPLICATIONS_FILE: &str = "prospects.json";

pub struct SnapshotStore {
    jobs: Vec<JobPosting>,
    job_index: HashMap<String, usize>,
    candidates: Vec<Candidate>,
    applications: Vec<Application>,
    tallies: HashMap<String, ApplicationTally>,
    loaded_at: DateTime<Utc>,
}

impl SnapshotStore {
    pub fn new(
        jobs: Vec<JobPosting>,
        candidates: Vec<Candidate>,
        applications: Vec<Application>,
    ) -> Self {
        let job_index = jobs
            .iter()
            .enumerate()
            .map(|(i, job)| (job.id.clone(), i))
            .collect();
        let tallies = tally_applications(&applications);
        Self {
            jobs,
            job_index,
            candidates,
            applications,
            tallies,
            loaded_at: Utc::now(),
        }
    }

    /// Loads the three snapshot files from `dir`. A missing file yields an
    /// empty collection; a file that is not a JSON object is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let jobs = normalize_jobs(&read_collection(&dir.join(JOBS_FILE))?);
        let candidates = normalize_candidates(&read_collection(&dir.join(CANDIDATES_FILE))?);
        let applications =
            normalize_applications(&read_collection(&dir.join(APPLICATIONS_FILE))?);

        let store = Self::new(jobs.records, candidates.records, applications.records);
        info!(
            jobs = store.jobs.len(),
            candidates = store.candidates.len(),
            applications = store.applications.len(),
            jobs_with_applications = store.jobs_with_applications(),
            skipped = jobs.skipped + candidates.skipped + applications.skipped,
            "Snapshot loaded from {}",
            dir.display()
        );
        Ok(store)
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn jobs_with_applications(&self) -> usize {
        self.jobs
            .iter()
            .filter(|job| {
                self.tallies
                    .get(&job.id)
                    .is_some_and(has_applications)
            })
            .count()
    }
}

fn read_collection(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        info!("Snapshot file {} not found; using an empty collection", path.display());
        return Ok(Map::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Snapshot file {} is not valid JSON", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!(
            "Snapshot file {} must hold an object keyed by identifier",
            path.display()
        ),
    }
}

#[async_trait]
impl JobStore for SnapshotStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Snapshot
    }

    async fn search_jobs(&self, query: &SearchQuery) -> Result<SearchPage> {
        Ok(search_in_memory(&self.jobs, &self.tallies, query))
    }

    async fn find_job(&self, id: &str) -> Result<Option<JobPosting>> {
        Ok(self.job_index.get(id).map(|&i| self.jobs[i].clone()))
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.candidates.clone())
    }

    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            total_jobs: self.jobs.len() as i64,
            jobs_with_applications: self.jobs_with_applications() as i64,
            total_candidates: self.candidates.len() as i64,
        })
    }
}
