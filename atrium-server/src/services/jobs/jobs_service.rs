use axum::{
    extract::{Path, State},
    routing, Json, Router,
};
use atrium_core::ApiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::error::{validate_payload, ServerError};
use crate::services::auth::Admin;
use crate::state::AppState;

/// A job posting on the careers page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub location: String,
    pub employment_type: String,
    pub description: String,
    /// Closed postings stay listable for the admin but read as closed
    pub open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct NewJob {
    #[validate(length(min = 1, max = 120, message = "title must be 1-120 characters"))]
    #[serde(default)]
    title: String,

    #[validate(length(min = 1, max = 120, message = "location must be 1-120 characters"))]
    #[serde(default)]
    location: String,

    #[validate(length(min = 1, max = 60, message = "employmentType must be 1-60 characters"))]
    #[serde(default)]
    employment_type: String,

    #[validate(length(min = 1, max = 8000, message = "description must be 1-8000 characters"))]
    #[serde(default)]
    description: String,
}

/// Partial update; absent fields are left alone.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobPatch {
    title: Option<String>,
    location: Option<String>,
    employment_type: Option<String>,
    description: Option<String>,
    open: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", routing::get(list).post(create))
        .route(
            "/{id}",
            routing::get(get_one).patch(update).delete(remove),
        )
}

/// `GET /jobs` — oldest first, the order the careers page renders.
async fn list(State(state): State<AppState>) -> Result<Json<Vec<JobPosting>>, ServerError> {
    let mut jobs = state.jobs.list().await;
    jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Json(jobs))
}

/// `GET /jobs/{id}`
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobPosting>, ServerError> {
    state
        .jobs
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ServerError::from(ApiError::not_found(format!("Job not found: {id}"))))
}

/// `POST /jobs` — admin creates a posting, open by default.
async fn create(
    State(state): State<AppState>,
    Admin(_): Admin,
    Json(body): Json<NewJob>,
) -> Result<Json<JobPosting>, ServerError> {
    validate_payload(&body)?;

    let now = Utc::now();
    let job = JobPosting {
        id: format!("job:{}", Uuid::new_v4()),
        title: body.title,
        location: body.location,
        employment_type: body.employment_type,
        description: body.description,
        open: true,
        created_at: now,
        updated_at: now,
    };

    let id = job.id.clone();
    let job = state.jobs.upsert(&id, job).await?;
    Ok(Json(job))
}

/// `PATCH /jobs/{id}` — admin edits fields or toggles `open`.
async fn update(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Result<Json<JobPosting>, ServerError> {
    let Some(mut job) = state.jobs.get(&id).await else {
        return Err(ServerError::from(ApiError::not_found(format!(
            "Job not found: {id}"
        ))));
    };

    if let Some(title) = patch.title {
        job.title = title;
    }
    if let Some(location) = patch.location {
        job.location = location;
    }
    if let Some(employment_type) = patch.employment_type {
        job.employment_type = employment_type;
    }
    if let Some(description) = patch.description {
        job.description = description;
    }
    if let Some(open) = patch.open {
        job.open = open;
    }
    job.updated_at = Utc::now();

    let job = state.jobs.upsert(&id, job).await?;
    Ok(Json(job))
}

/// `DELETE /jobs/{id}`
async fn remove(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServerError> {
    match state.jobs.remove(&id).await? {
        Some(removed) => Ok(Json(json!(removed))),
        None => Err(ServerError::from(ApiError::not_found(format!(
            "Job not found: {id}"
        )))),
    }
}
