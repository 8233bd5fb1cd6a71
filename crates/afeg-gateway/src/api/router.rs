//! API router configuration.

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health and status
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::gateway_status))
        // Valuation gateway
        .route("/gateway", post(handlers::submit_query))
        // Ledger
        .route("/ledger", get(handlers::query_ledger))
        .route("/ledger", delete(handlers::clear_ledgers))
        .route("/ledger/export", get(handlers::export_ledgers))
        // Surge synthesis
        .route("/surge", post(handlers::run_surge))
        // Treasury (digest-gated)
        .route("/treasury", get(handlers::treasury_view));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http());

    if state.config.server.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
