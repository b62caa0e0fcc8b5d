//! Router configuration for the HTTP API.
//!
//! Sets up all routes and the middleware stack (CORS, compression,
//! tracing) and returns an axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS: the API is consumed by a mobile client through a
    // proxy, origin restrictions happen upstream.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Liveness and store health
        .route("/test", get(handlers::test))
        .route("/test-db", get(handlers::test_db))
        .route("/health", get(handlers::health))
        // Region snapshots and history
        .route("/region/{code}", get(handlers::get_region))
        .route("/region/{code}/history", get(handlers::get_region_history))
        .route(
            "/region/{code}/history/{timestamp}",
            get(handlers::get_region_history_at),
        )
        .route("/region/{code}/refresh", post(handlers::refresh_region))
        .route("/regions", get(handlers::list_regions))
        // Authentication
        .route("/auth/login", post(handlers::login))
        .route("/auth/health", get(handlers::auth_health));

    Router::new()
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
