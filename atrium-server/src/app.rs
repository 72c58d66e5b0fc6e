use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::services;
use crate::state::AppState;

/// Assemble the full router: API routes, the static upload directory,
/// and the middleware stack.
pub fn router(state: AppState, config: &AppConfig) -> Router {
    let api = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/auth", services::auth::router())
        .nest("/assets", services::assets::router())
        .nest("/reviews", services::reviews::router())
        .nest("/jobs", services::jobs::router())
        .nest("/applications", services::applications::router())
        .with_state(state);

    // Uploaded files are served straight off disk, so the URLs the asset
    // store hands out resolve against this same server.
    api.nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.body_limit_mb * 1024 * 1024))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
