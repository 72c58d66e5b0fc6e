use axum::{
    extract::{Multipart, Path, State},
    routing, Json, Router,
};
use atrium_core::ApiError;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::error::ServerError;
use crate::services::auth::Admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", routing::get(list).post(create))
        .route("/{key}", routing::get(get_one).delete(remove))
}

/// `GET /assets` — every stored asset as a key → url map.
async fn list(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
    let all = state.assets.list_all().await.map_err(ServerError::from)?;
    Ok(Json(json!(all)))
}

/// `GET /assets/{key}` — one asset, 404 if the key is unknown.
async fn get_one(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ServerError> {
    let asset = state.assets.lookup(&key).await.map_err(ServerError::from)?;
    Ok(Json(json!({ "key": asset.key, "url": asset.url })))
}

/// `POST /assets` — multipart upload with a `key` text field and a `file`
/// field. Replaces whatever the key pointed at before; the superseded
/// file is cleaned up by the store.
async fn create(
    State(state): State<AppState>,
    Admin(_): Admin,
    mut multipart: Multipart,
) -> Result<Json<Value>, ServerError> {
    let mut key: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ServerError::from(ApiError::bad_request(format!(
            "Failed to parse the multipart request body: {e}"
        )))
    })? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("key") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ServerError::from(ApiError::bad_request(e.to_string())))?;
                key = Some(value);
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("file").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::from(ApiError::bad_request(e.to_string())))?;
                file = Some((filename, data));
            }
            // Unknown fields are ignored, matching the forgiving intake
            // the admin dashboard expects.
            _ => {}
        }
    }

    let key = key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ServerError::from(ApiError::bad_request("Upload requires a 'key' field")))?;
    let (filename, data) = file
        .ok_or_else(|| ServerError::from(ApiError::bad_request("Upload requires a 'file' field")))?;
    if data.is_empty() {
        return Err(ServerError::from(ApiError::bad_request(
            "Uploaded file is empty",
        )));
    }

    let stored = state
        .assets
        .upload(&key, data, &filename)
        .await
        .map_err(ServerError::from)?;

    Ok(Json(json!({
        "success": true,
        "key": stored.key,
        "url": stored.url
    })))
}

/// `DELETE /assets/{key}` — remove the record and its file. Succeeds even
/// when the key never existed; the admin UI treats delete as idempotent.
async fn remove(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(key): Path<String>,
) -> Result<Json<Value>, ServerError> {
    let deleted = state.assets.delete(&key).await.map_err(ServerError::from)?;

    if !deleted.existed {
        tracing::debug!(key = %deleted.key, "delete for a key with no record");
    }

    Ok(Json(json!({ "success": true, "key": deleted.key })))
}
