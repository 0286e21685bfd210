//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::services::importer::Endpoint;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub importer: String,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: reports whether the import endpoint is configured.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let importer = match Endpoint::parse(state.config.importer.api_server.as_deref()) {
        Ok(endpoint) => format!("configured: {}", endpoint.base),
        Err(e) => {
            tracing::warn!(error = %e, "Import endpoint not usable");
            format!("error: {e}")
        }
    };

    ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        importer,
    })
}
