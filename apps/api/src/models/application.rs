use serde::{Deserialize, Serialize};

/// Status text that marks an application as a hire. Matched as a
/// case-sensitive substring of the free-text status.
pub const HIRED_MARKER: &str = "Contratado pela Decision";

/// One candidate's application (prospect) to one job posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub job_id: String,
    pub candidate_id: String,
    pub candidate_name: String,
    pub status: String,
    pub applied_on: String,
    pub comment: String,
    pub recruiter: String,
    pub hired: bool,
}

impl Application {
    /// Returns true when `status` carries the hired marker.
    pub fn is_hired_status(status: &str) -> bool {
        status.contains(HIRED_MARKER)
    }
}
