//! Search & Pagination: filters job postings that have applications by free
//! text and professional level, and pages the result deterministically.
//!
//! The primary store implements the same contract in SQL
//! (`store::postgres`); this module holds the shared types, the shared
//! "has applications" rule, and the in-memory implementation used by the
//! snapshot backend.

pub mod handlers;
pub mod pagination;

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use sqlx::FromRow;

use crate::models::{Application, JobPosting};

pub use pagination::{PageWindow, Pagination};

/// Validated search input. `page` may be out of range; it is clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub level: String,
    pub page: i64,
    pub per_page: i64,
}

/// Fixed projection of a job posting for listing views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub client: String,
    pub level: String,
    pub fields_of_practice: String,
    pub city: String,
    pub total_candidates: i64,
    pub total_hired: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub items: Vec<JobSummary>,
    pub total: i64,
    pub total_pages: i64,
    pub page: i64,
    pub per_page: i64,
    pub distinct_levels: Vec<String>,
    pub window: PageWindow,
}

impl SearchPage {
    pub fn new(items: Vec<JobSummary>, pagination: Pagination, distinct_levels: Vec<String>) -> Self {
        Self {
            items,
            total: pagination.total,
            total_pages: pagination.total_pages,
            page: pagination.page,
            per_page: pagination.per_page,
            distinct_levels,
            window: pagination.window(),
        }
    }
}

/// Per-job application counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationTally {
    pub total: i64,
    pub hired: i64,
}

/// The "has applications" rule shared by both backends.
pub fn has_applications(tally: &ApplicationTally) -> bool {
    tally.total > 0
}

pub fn tally_applications(applications: &[Application]) -> HashMap<String, ApplicationTally> {
    let mut tallies: HashMap<String, ApplicationTally> = HashMap::new();
    for application in applications {
        let tally = tallies.entry(application.job_id.clone()).or_default();
        tally.total += 1;
        tally.hired += i64::from(application.hired);
    }
    tallies
}

/// Sorted, de-duplicated, non-empty professional levels across all jobs.
pub fn distinct_levels(jobs: &[JobPosting]) -> Vec<String> {
    jobs.iter()
        .map(|job| job.professional_level.as_str())
        .filter(|level| !level.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn matches_term(job: &JobPosting, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    [&job.title, &job.client, &job.fields_of_practice]
        .iter()
        .any(|field| field.to_lowercase().contains(term))
}

fn matches_level(job: &JobPosting, level: &str) -> bool {
    level.is_empty() || job.professional_level.to_lowercase().contains(level)
}

/// In-memory search over a loaded collection. Level matching is a
/// case-insensitive substring match.
pub fn search_in_memory(
    jobs: &[JobPosting],
    tallies: &HashMap<String, ApplicationTally>,
    query: &SearchQuery,
) -> SearchPage {
    let term = query.term.trim().to_lowercase();
    let level = query.level.trim().to_lowercase();

    let mut eligible: Vec<(&JobPosting, ApplicationTally)> = jobs
        .iter()
        .filter_map(|job| {
            let tally = tallies.get(&job.id).copied().unwrap_or_default();
            has_applications(&tally).then_some((job, tally))
        })
        .filter(|(job, _)| matches_term(job, &term) && matches_level(job, &level))
        .collect();
    eligible.sort_by(|(a, _), (b, _)| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));

    let pagination = Pagination::new(query.page, query.per_page, eligible.len() as i64);
    let items = eligible[pagination.slice_range(eligible.len())]
        .iter()
        .map(|(job, tally)| JobSummary {
            id: job.id.clone(),
            title: job.title.clone(),
            client: job.client.clone(),
            level: job.professional_level.clone(),
            fields_of_practice: job.fields_of_practice.clone(),
            city: job.city.clone(),
            total_candidates: tally.total,
            total_hired: tally.hired,
        })
        .collect();

    SearchPage::new(items, pagination, distinct_levels(jobs))
}
