//! Health check endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// `ready`, or `degraded` when the loan store is unreachable
    pub status: String,
    /// Version of the service
    pub version: String,
    /// Loan store connectivity
    pub store: String,
    /// Configured loan store base URL
    pub store_url: String,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint (checks loan store connectivity)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Readiness and loan store status", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(State(state): State<crate::AppState>) -> Json<ReadinessResponse> {
    let (status, store) = match state.services.store.ping().await {
        Ok(()) => ("ready", "operational".to_string()),
        Err(e) => {
            tracing::warn!("Loan store not reachable: {}", e);
            ("degraded", format!("error: {}", e))
        }
    };

    Json(ReadinessResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
        store_url: state.config.store.url.clone(),
    })
}
