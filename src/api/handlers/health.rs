//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "storage": { "status": "ok", "message": "Connected, 42 records" },
///     "job_queue": { "status": "ok", "message": "Backend: memory" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let storage = check_storage(&state).await;
    let job_queue = check_job_queue(&state).await;

    let all_healthy = storage.is_ok() && job_queue.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { storage, job_queue },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_storage(state: &AppState) -> CheckStatus {
    if !state.link_service.storage_healthy().await {
        return CheckStatus::error("Storage unreachable");
    }

    match state.link_service.stats().await {
        Ok(stats) => CheckStatus::ok(format!("Connected, {} records", stats.records)),
        Err(e) => CheckStatus::error(format!("Storage error: {}", e)),
    }
}

async fn check_job_queue(state: &AppState) -> CheckStatus {
    let backend = state.link_service.queue_backend();

    if state.link_service.queue_healthy().await {
        CheckStatus::ok(format!("Backend: {}", backend))
    } else {
        CheckStatus::error(format!("Backend {} unavailable", backend))
    }
}
