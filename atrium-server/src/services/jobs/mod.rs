mod jobs_service;

pub use jobs_service::{router, JobPosting};
