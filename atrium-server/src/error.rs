use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use atrium_assets::AssetError;
use atrium_core::ApiError;
use validator::Validate;

/// Boundary error for every handler. Anything that can flow through
/// `anyhow::Error` ends up here; `IntoResponse` decides the wire shape.
#[derive(Debug)]
pub struct ServerError(pub anyhow::Error);

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<ApiError> for ServerError {
    fn from(e: ApiError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<AssetError> for ServerError {
    fn from(e: AssetError) -> Self {
        Self(ApiError::from(e).into_anyhow())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // If an ApiError is anywhere in the chain (even wrapped by anyhow
        // contexts), preserve its structured fields.
        if let Some(api) = self.0.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
            let safe = api.sanitize_for_client();
            let status =
                StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, Json(safe.to_json())).into_response();
        }

        // Fallback: anything else becomes a generic 500.
        tracing::error!(error = %self.0, "unhandled error reached the response boundary");
        let api = ApiError::general_error(self.0.to_string());
        let status =
            StatusCode::from_u16(api.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(api.to_json())).into_response()
    }
}

/// Run derive-based validation and convert failures into a 422 with a
/// field → messages map, the shape clients already consume.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), ServerError> {
    payload.validate().map_err(|errs| {
        let mut fields = serde_json::Map::new();
        for (field, errors) in errs.field_errors() {
            let messages: Vec<serde_json::Value> = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} failed {}", e.code))
                })
                .map(serde_json::Value::String)
                .collect();
            fields.insert(field.to_string(), serde_json::Value::Array(messages));
        }

        ServerError::from(
            ApiError::unprocessable("Validation failed")
                .with_errors(serde_json::Value::Object(fields)),
        )
    })
}
