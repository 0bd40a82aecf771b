pub mod auth;
pub mod config;
pub mod handlers;
pub mod jira;
pub mod mcp;
pub mod models;
pub mod state;
pub mod tools;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use state::AppState;

/// Build the HTTP transport router with the given state.
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a network port.
pub fn create_router(state: AppState) -> Router {
    let mcp = Router::new()
        .route("/mcp", post(mcp::server::mcp_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/api/health", get(handlers::health))
        .merge(mcp)
        .with_state(state)
}
