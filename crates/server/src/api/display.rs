//! Display API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use weatharr_core::OrchestratorStatus;

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Latest frame handed to the display sink. The radar image is omitted from
/// the JSON; fetch it from `/feeds/radar/image`.
pub async fn get_display(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator().latest_snapshot() {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorResponse::new("No frame rendered yet"),
        )
            .into_response(),
    }
}

/// Orchestrator status: running flag, active panel, scheduler and cache.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<OrchestratorStatus> {
    Json(state.orchestrator().status().await)
}
