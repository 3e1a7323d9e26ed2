//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, loans, reports};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Library Reports API",
        version = "1.0.0",
        description = "Loan tracking, overdue reports and CSV export for a school library"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::create_loan,
        loans::return_loan,
        loans::delete_loan,
        // Reports
        reports::get_loan_report,
        reports::get_overdue_report,
        reports::get_summary,
        reports::export_loan_report,
        reports::refresh_reports,
    ),
    components(
        schemas(
            // Loans
            loans::CreateLoanRequest,
            loans::ReturnLoanRequest,
            crate::models::loan::LoanRecord,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanMetrics,
            crate::models::loan::LoanView,
            crate::models::book::BookSnapshot,
            crate::models::book::Category,
            crate::models::student::StudentSnapshot,
            // Reports
            crate::models::report::ReportRow,
            crate::models::report::ReportView,
            crate::models::report::LoanSummary,
            reports::ExportWarning,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "loans", description = "Loan management"),
        (name = "reports", description = "Loan reports and export")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
