//! Report endpoints

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::report::{LoanSummary, ReportFilter, ReportView},
    services::export::ExportOutcome,
};

use super::{evaluation_instant, AsOfQuery};

/// Report filter query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Case-insensitive part of the student's name
    pub name: Option<String>,
    /// Exact grade (case-insensitive)
    pub grade: Option<String>,
    /// Exact major (case-insensitive)
    pub major: Option<String>,
    /// Evaluation instant for statuses (RFC 3339, defaults to now)
    pub as_of: Option<DateTime<Utc>>,
}

impl ReportQuery {
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            name: self.name.clone(),
            grade: self.grade.clone(),
            major: self.major.clone(),
        }
    }
}

/// Returned instead of a file when nothing matches the export filters
#[derive(Serialize, ToSchema)]
pub struct ExportWarning {
    pub warning: String,
}

/// Filtered loan report
#[utoipa::path(
    get,
    path = "/reports/loans",
    tag = "reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report rows; empty with a notice when the loan store is unavailable", body = ReportView)
    )
)]
pub async fn get_loan_report(
    State(state): State<crate::AppState>,
    Query(query): Query<ReportQuery>,
) -> Json<ReportView> {
    let view = state
        .services
        .reports
        .loan_report(&query.filter(), evaluation_instant(query.as_of))
        .await;
    Json(view)
}

/// Overdue loans report
#[utoipa::path(
    get,
    path = "/reports/overdue",
    tag = "reports",
    params(AsOfQuery),
    responses(
        (status = 200, description = "Overdue report rows", body = ReportView)
    )
)]
pub async fn get_overdue_report(
    State(state): State<crate::AppState>,
    Query(query): Query<AsOfQuery>,
) -> Json<ReportView> {
    let view = state
        .services
        .reports
        .overdue_report(evaluation_instant(query.as_of))
        .await;
    Json(view)
}

/// Loan counts per status
#[utoipa::path(
    get,
    path = "/reports/summary",
    tag = "reports",
    params(AsOfQuery),
    responses(
        (status = 200, description = "Loan counts", body = LoanSummary),
        (status = 502, description = "Loan store unavailable")
    )
)]
pub async fn get_summary(
    State(state): State<crate::AppState>,
    Query(query): Query<AsOfQuery>,
) -> AppResult<Json<LoanSummary>> {
    let summary = state
        .services
        .reports
        .summary(evaluation_instant(query.as_of))
        .await?;
    Ok(Json(summary))
}

/// Export the filtered loan report as CSV
#[utoipa::path(
    get,
    path = "/reports/loans/export",
    tag = "reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "CSV attachment, or a JSON warning when no rows match", body = String, content_type = "text/csv"),
        (status = 502, description = "Loan store unavailable")
    )
)]
pub async fn export_loan_report(
    State(state): State<crate::AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .reports
        .export(&query.filter(), evaluation_instant(query.as_of))
        .await?;

    let response = match outcome {
        ExportOutcome::Empty => Json(ExportWarning {
            warning: "No loans match the current filters; nothing to export".to_string(),
        })
        .into_response(),
        ExportOutcome::Csv { filename, content, .. } => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            content,
        )
            .into_response(),
    };

    Ok(response)
}

/// Drop the cached loan snapshot
#[utoipa::path(
    post,
    path = "/reports/refresh",
    tag = "reports",
    responses(
        (status = 204, description = "Report cache cleared")
    )
)]
pub async fn refresh_reports(State(state): State<crate::AppState>) -> StatusCode {
    state.services.reports.refresh().await;
    StatusCode::NO_CONTENT
}
