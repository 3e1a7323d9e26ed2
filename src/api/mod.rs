//! API handlers for the library reports REST endpoints

pub mod health;
pub mod loans;
pub mod openapi;
pub mod reports;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::IntoParams;

use crate::AppState;

/// Evaluation instant query shared by status-bearing endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AsOfQuery {
    /// Evaluation instant for statuses (RFC 3339, defaults to now)
    pub as_of: Option<DateTime<Utc>>,
}

/// Instant statuses are computed against
pub(crate) fn evaluation_instant(as_of: Option<DateTime<Utc>>) -> DateTime<Utc> {
    as_of.unwrap_or_else(Utc::now)
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/loans/:id", get(loans::get_loan).delete(loans::delete_loan))
        .route("/loans/:id/return", post(loans::return_loan))
        // Reports
        .route("/reports/loans", get(reports::get_loan_report))
        .route("/reports/loans/export", get(reports::export_loan_report))
        .route("/reports/overdue", get(reports::get_overdue_report))
        .route("/reports/summary", get(reports::get_summary))
        .route("/reports/refresh", post(reports::refresh_reports))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
