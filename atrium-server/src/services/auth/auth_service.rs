use axum::{extract::State, routing, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/login", routing::post(login))
}

/// `POST /auth/login` — check the admin credentials and hand out an
/// access token. Failures are uniform 401s.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ServerError> {
    let email = state.credentials.verify(&body.email, &body.password)?;
    let access_token = state.tokens.issue(&email)?;

    tracing::info!(email = %email, "admin login");

    Ok(Json(json!({
        "accessToken": access_token,
        "user": { "email": email }
    })))
}
