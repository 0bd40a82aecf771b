// ---------------------------------------------------------------------------
// handlers.rs — HTTP health endpoint (HTTP transport only)
// ---------------------------------------------------------------------------

use axum::Json;
use axum::extract::State;

use crate::models::HealthResponse;
use crate::state::AppState;

/// GET /api/health — liveness plus whether the Jira client has been built.
///
/// Never touches Jira itself, so it stays cheap and works before the first
/// tool call.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        app: crate::mcp::server::SERVER_NAME.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        jira_connected: state.tracker.is_connected(),
    })
}
