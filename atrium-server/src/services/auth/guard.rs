use atrium_auth::{extract_bearer_token, AdminClaims};
use atrium_core::ApiError;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};

use crate::error::ServerError;
use crate::state::AppState;

/// Extractor gating admin-only routes. Reads `Authorization: Bearer
/// <token>` and verifies it against the configured issuer; rejections are
/// structured 401 responses.
pub struct Admin(pub AdminClaims);

impl FromRequestParts<AppState> for Admin {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let token = extract_bearer_token(header)
            .ok_or_else(|| ServerError::from(ApiError::not_authenticated("No access token")))?;

        let claims = state.tokens.verify(&token)?;
        Ok(Admin(claims))
    }
}
