use axum::{extract::State, routing, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::error::{validate_payload, ServerError};
use crate::services::auth::Admin;
use crate::state::AppState;

/// A submitted job application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Free-form role or posting title the applicant is responding to
    pub role: Option<String>,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
struct NewApplication {
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    #[serde(default)]
    name: String,

    #[validate(email(message = "email must be a valid email"))]
    #[serde(default)]
    email: String,

    #[validate(length(max = 40, message = "phone must be at most 40 characters"))]
    phone: Option<String>,

    #[validate(length(max = 120, message = "role must be at most 120 characters"))]
    role: Option<String>,

    #[validate(length(min = 1, max = 4000, message = "message must be 1-4000 characters"))]
    #[serde(default)]
    message: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", routing::get(list).post(create))
}

/// `POST /applications` — public submission. The ledger row is the
/// durable record; the collection document backs the admin listing.
async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewApplication>,
) -> Result<Json<Value>, ServerError> {
    validate_payload(&body)?;

    let application = JobApplication {
        id: format!("application:{}", Uuid::new_v4()),
        name: body.name,
        email: body.email,
        phone: body.phone,
        role: body.role,
        message: body.message,
        submitted_at: Utc::now(),
    };

    state.ledger.append(&application).await?;
    let id = application.id.clone();
    let application = state.applications.upsert(&id, application).await?;

    tracing::info!(id = %application.id, "application received");

    Ok(Json(json!({ "success": true, "id": application.id })))
}

/// `GET /applications` — admin listing, newest first.
async fn list(
    State(state): State<AppState>,
    Admin(_): Admin,
) -> Result<Json<Vec<JobApplication>>, ServerError> {
    let mut applications = state.applications.list().await;
    applications.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(Json(applications))
}
