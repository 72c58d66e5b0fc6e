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

/// A customer review as stored and served.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: String,
    pub rating: u8,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
struct NewReview {
    #[validate(length(min = 1, max = 80, message = "author must be 1-80 characters"))]
    #[serde(default)]
    author: String,

    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    #[serde(default)]
    rating: u8,

    #[validate(length(min = 1, max = 2000, message = "body must be 1-2000 characters"))]
    #[serde(default)]
    body: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", routing::get(list).post(create))
        .route("/{id}", routing::delete(remove))
}

/// `GET /reviews` — newest first.
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Review>>, ServerError> {
    let mut reviews = state.reviews.list().await;
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(reviews))
}

/// `POST /reviews` — public submission, validated.
async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewReview>,
) -> Result<Json<Review>, ServerError> {
    validate_payload(&body)?;

    let review = Review {
        id: format!("review:{}", Uuid::new_v4()),
        author: body.author,
        rating: body.rating,
        body: body.body,
        created_at: Utc::now(),
    };

    let id = review.id.clone();
    let review = state.reviews.upsert(&id, review).await?;
    Ok(Json(review))
}

/// `DELETE /reviews/{id}` — admin moderation.
async fn remove(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServerError> {
    match state.reviews.remove(&id).await? {
        Some(removed) => Ok(Json(json!(removed))),
        None => Err(ServerError::from(ApiError::not_found(format!(
            "Review not found: {id}"
        )))),
    }
}
