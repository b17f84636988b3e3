//! Router assembly.

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower::util::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::indicator::Envelope;

use super::handlers::{self, AppState};

/// Build the full application router.
///
/// `/api/*` routes answer JSON; everything else falls through to the
/// static frontend directory with an SPA-style `index.html` fallback.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origin_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/uganda/summary", get(handlers::summary))
        .route("/api/uganda/profile", get(handlers::country_profile))
        .route("/api/uganda/indicators", get(handlers::indicators_index))
        .route(
            "/api/uganda/indicators/:code",
            get(handlers::indicator_by_code),
        )
        .route("/api/uganda/trends/:domain", get(handlers::domain_trends))
        .route("/api/uganda/:domain", get(handlers::domain_batch))
        .route("/api/proxy", get(handlers::proxy))
        .fallback(spa_fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unmatched paths: JSON 404 under `/api`, static files elsewhere.
async fn spa_fallback(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path();
    if path == "/api" || path.starts_with("/api/") {
        return (
            StatusCode::NOT_FOUND,
            Json(Envelope::<()>::error("API endpoint not found".to_string())),
        )
            .into_response();
    }

    let index = format!("{}/index.html", state.config.static_dir);
    let serve = ServeDir::new(&state.config.static_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(index));

    match serve.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(infallible) => match infallible {},
    }
}
