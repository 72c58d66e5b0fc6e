mod app;
mod config;
mod error;
mod services;
mod state;

use std::sync::Arc;

use anyhow::Result;
use atrium_assets::{AssetStore, AssetStoreConfig, FsBlobStore, JsonAssetIndex};
use atrium_auth::{AdminCredentials, TokenIssuer};
use atrium_core::JsonCollection;
use axum::Router;
use chrono::Duration;

use crate::services::applications::ApplicationsLedger;

pub use config::AppConfig;
pub use state::AppState;

/// Build the application router from a resolved config. Opens every
/// store up front so a broken data directory fails the boot, not the
/// first request.
pub async fn build(config: AppConfig) -> Result<Router> {
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let blobs = FsBlobStore::new(
        AssetStoreConfig::new()
            .with_upload_dir(config.upload_dir.clone())
            .with_public_base_url(config.public_base_url.clone()),
    )
    .await?;
    let index = JsonAssetIndex::open(config.data_dir.join("assets.json")).await?;
    let assets = Arc::new(AssetStore::new(blobs, index));

    let reviews = JsonCollection::open(config.data_dir.join("reviews.json")).await?;
    let jobs = JsonCollection::open(config.data_dir.join("jobs.json")).await?;
    let applications = JsonCollection::open(config.data_dir.join("applications.json")).await?;
    let ledger = ApplicationsLedger::open(config.data_dir.join("applications.csv")).await?;

    let credentials = match (&config.admin_password_hash, &config.admin_password) {
        (Some(hash), _) => AdminCredentials::new(config.admin_email.clone(), hash.clone()),
        (None, Some(password)) => {
            AdminCredentials::from_plaintext(config.admin_email.clone(), password)?
        }
        (None, None) => {
            return Err(anyhow::anyhow!(
                "admin credentials missing: set a password hash or a plaintext password"
            ))
        }
    };
    let tokens = TokenIssuer::new(config.jwt_secret.clone())
        .with_ttl(Duration::hours(config.token_ttl_hours));

    let state = AppState {
        assets,
        reviews,
        jobs,
        applications,
        ledger,
        credentials,
        tokens,
    };

    Ok(app::router(state, &config))
}
