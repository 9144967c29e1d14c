use axum::Json;
use serde::Serialize;

/// Health check payload.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Liveness check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
