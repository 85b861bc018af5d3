use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span, request_id_middleware};

use super::{handlers, AppState};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Preferences
        .route("/preferences", get(handlers::get_preferences))
        .route("/preferences", post(handlers::update_preferences))
        // Queue
        .route("/queue/dynamic", post(handlers::dynamic_queue))
        .route("/queue/:id", post(handlers::enqueue_track))
        .route("/candidates", get(handlers::list_candidates))
        // Feedback & model
        .route("/skip", post(handlers::skip))
        .route("/played", post(handlers::played))
        .route("/predict", post(handlers::predict))
        .route("/train", post(handlers::train))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
