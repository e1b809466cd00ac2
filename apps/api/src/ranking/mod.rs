//! Ranking Service: scores every candidate against one job and orders them
//! best first.

pub mod handlers;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{Candidate, JobPosting};
use crate::scoring::classifier::{positive_probability, to_match_score};
use crate::scoring::{derive_features, Classifier, FeatureMode};

/// The candidate fields shown next to a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub academic_level: String,
    pub field_of_practice: String,
}

impl From<&Candidate> for CandidateView {
    fn from(c: &Candidate) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            academic_level: c.academic_level.clone(),
            field_of_practice: c.field_of_practice.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: CandidateView,
    /// Positive-class probability × 100, two decimals.
    pub match_score: f64,
}

/// Scores each candidate for `job` and returns them sorted by `match_score`
/// descending. Ties keep input order. A candidate whose features or
/// prediction fail is logged and left out.
pub fn rank(
    job: &JobPosting,
    candidates: &[Candidate],
    mode: FeatureMode,
    classifier: &dyn Classifier,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .filter_map(|candidate| match score(job, candidate, mode, classifier) {
            Ok(match_score) => Some(RankedCandidate {
                candidate: CandidateView::from(candidate),
                match_score,
            }),
            Err(e) => {
                warn!(job_id = %job.id, candidate_id = %candidate.id, error = %e, "Skipping candidate");
                None
            }
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

    debug!(
        job_id = %job.id,
        ranked = ranked.len(),
        dropped = candidates.len() - ranked.len(),
        "Ranked candidates"
    );
    ranked
}

fn score(
    job: &JobPosting,
    candidate: &Candidate,
    mode: FeatureMode,
    classifier: &dyn Classifier,
) -> anyhow::Result<f64> {
    let features = derive_features(job, candidate, mode)?;
    let probabilities = classifier.predict_proba(&features)?;
    Ok(to_match_score(positive_probability(&probabilities)))
}
