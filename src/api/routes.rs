use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        // Request IDs are assigned outside the trace layer so the span can
        // pick them up.
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/discover", post(handlers::discover))
        .route("/suggestions", get(handlers::get_suggestions))
        .route("/videos/search", get(handlers::search_videos))
        .route(
            "/feedback",
            post(handlers::submit_feedback).delete(handlers::clear_feedback),
        )
        .route("/liked", get(handlers::get_liked))
}
