use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use crate::http::server::AppState;
use crate::security::AccessLogEntry;
use crate::session::SessionSummary;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub gate_enabled: bool,
    pub active_sessions: usize,
    pub max_requests_per_minute: usize,
    pub max_requests_per_hour: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let policy = state.policy.load();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        gate_enabled: policy.config.enabled,
        active_sessions: state.sessions.len(),
        max_requests_per_minute: policy.config.max_requests_per_minute,
        max_requests_per_hour: policy.config.max_requests_per_hour,
    })
}

pub async fn get_sessions(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    Json(state.sessions.summaries(state.clock.now()))
}

/// Access log of one session, oldest first.
pub async fn get_session_log(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Vec<AccessLogEntry>>, StatusCode> {
    let handle = state.sessions.get(&token).ok_or(StatusCode::NOT_FOUND)?;
    let session = handle.lock().map_err(|e| {
        tracing::error!(error = %e, "Cannot read session log");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(session.access_log().to_vec()))
}
