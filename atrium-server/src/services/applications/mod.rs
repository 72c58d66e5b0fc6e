mod applications_service;
mod ledger;

pub use applications_service::{router, JobApplication};
pub use ledger::ApplicationsLedger;
