//! Health and status handler

use crate::api::rest::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
    pub instances: InstanceCounts,
}

/// Directory statistics
#[derive(Debug, Serialize)]
pub struct InstanceCounts {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let (active, inactive) = state.registry.status_counts();

    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        instances: InstanceCounts {
            total: state.registry.len(),
            active,
            inactive,
        },
    })
}
