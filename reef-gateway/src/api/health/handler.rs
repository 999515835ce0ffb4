//! Health API Handlers

use crate::core::ServerState;
use axum::{Json, extract::State};
use serde::Serialize;
use shared::ApiResponse;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub tracked_sessions: usize,
}

/// GET /api/health
pub async fn health(State(state): State<ServerState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "ok",
        tracked_sessions: state.tracker.session_count(),
    }))
}
