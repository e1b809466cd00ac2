pub mod application;
pub mod candidate;
pub mod job;

pub use application::Application;
pub use candidate::Candidate;
pub use job::JobPosting;
