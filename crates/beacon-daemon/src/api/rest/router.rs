//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
///
/// Paths are kept at the root (no version prefix) for compatibility
/// with existing registry clients.
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let mut router = Router::new()
        .route(
            "/register/:name/:version/:port",
            put(handlers::register_service),
        )
        .route(
            "/delete/:name/:version/:port",
            delete(handlers::unregister_service),
        )
        .route("/find/:name/:range", get(handlers::find_service))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}
