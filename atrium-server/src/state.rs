use std::sync::Arc;

use atrium_assets::AssetStore;
use atrium_auth::{AdminCredentials, TokenIssuer};
use atrium_core::JsonCollection;

use crate::services::applications::{ApplicationsLedger, JobApplication};
use crate::services::jobs::JobPosting;
use crate::services::reviews::Review;

/// Explicit application context: every handle the services need, built
/// once in `build()` and cloned into the router. Nothing here is reachable
/// through a global.
#[derive(Clone)]
pub struct AppState {
    pub assets: Arc<AssetStore>,
    pub reviews: JsonCollection<Review>,
    pub jobs: JsonCollection<JobPosting>,
    pub applications: JsonCollection<JobApplication>,
    pub ledger: ApplicationsLedger,
    pub credentials: AdminCredentials,
    pub tokens: TokenIssuer,
}
