//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, static_dir: &str) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/taxonomy", get(http::http_get_taxonomy))
        .route("/api/v1/course", get(http::http_get_course).patch(http::http_patch_course))
        .route("/api/v1/course/weeks", post(http::http_post_week))
        .route("/api/v1/course/reset", post(http::http_post_reset))
        .route("/api/v1/course/new", post(http::http_post_new_course))
        .route("/api/v1/activities", post(http::http_post_activity))
        .route("/api/v1/activities/drop", post(http::http_post_drop))
        .route(
            "/api/v1/activities/:id",
            axum::routing::put(http::http_put_activity).delete(http::http_delete_activity),
        )
        .route("/api/v1/activities/:id/move", post(http::http_post_move))
        .route("/api/v1/activities/:id/reorder", post(http::http_post_reorder))
        .route("/api/v1/activities/:id/bloom", post(http::http_post_bloom))
        .route("/api/v1/analytics", get(http::http_get_analytics))
        .route("/api/v1/report", get(http::http_get_report))
        .route("/api/v1/scenario", post(http::http_post_scenario))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
