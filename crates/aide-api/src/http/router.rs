//! Axum router configuration with middleware.
//!
//! Routes live under `/api/`. Middleware: CORS and request tracing. No
//! static file serving: the transport layer stops at JSON.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chat
        .route("/chat", post(handlers::chat::send_message))
        .route(
            "/chat/{session_id}/introspection",
            get(handlers::chat::get_introspection),
        )
        // Memory admin facade
        .route(
            "/memories",
            get(handlers::memory::list_memories).post(handlers::memory::create_memory),
        )
        .route(
            "/memories/{id}",
            put(handlers::memory::update_memory).delete(handlers::memory::delete_memory),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
