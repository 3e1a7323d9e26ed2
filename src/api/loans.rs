//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::loan::{LoanQuery, LoanView},
};

use super::{evaluation_instant, AsOfQuery};

/// List loans query
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLoansQuery {
    /// Only returned (`true`) or unreturned (`false`) loans
    pub returned: Option<bool>,
    pub student_id: Option<i32>,
    pub book_id: Option<i32>,
    /// Evaluation instant for statuses (RFC 3339, defaults to now)
    pub as_of: Option<DateTime<Utc>>,
}

/// Create loan request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoanRequest {
    /// Borrowing student
    #[validate(required(message = "A student must be selected"), range(min = 1))]
    pub student_id: Option<i32>,
    /// Borrowed book
    #[validate(required(message = "A book must be selected"), range(min = 1))]
    pub book_id: Option<i32>,
    /// Loan period in days (number or numeric string); invalid values use the default
    #[schema(value_type = Option<i64>)]
    pub due_days: Option<serde_json::Value>,
}

/// Return loan request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReturnLoanRequest {
    /// Return timestamp; the loan store uses its current time when omitted
    pub returned_at: Option<DateTime<Utc>>,
}

/// List loans with their computed status
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(ListLoansQuery),
    responses(
        (status = 200, description = "Loans in store order", body = Vec<LoanView>),
        (status = 502, description = "Loan store unavailable")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    Query(query): Query<ListLoansQuery>,
) -> AppResult<Json<Vec<LoanView>>> {
    let filter = LoanQuery {
        returned: query.returned,
        student_id: query.student_id,
        book_id: query.book_id,
    };

    let loans = state
        .services
        .loans
        .list_loans(&filter, evaluation_instant(query.as_of))
        .await?;
    Ok(Json(loans))
}

/// Get a loan with its computed status
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID"),
        AsOfQuery
    ),
    responses(
        (status = 200, description = "Loan", body = LoanView),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
    Query(query): Query<AsOfQuery>,
) -> AppResult<Json<LoanView>> {
    let loan = state
        .services
        .loans
        .get_loan(loan_id, evaluation_instant(query.as_of))
        .await?;
    Ok(Json(loan))
}

/// Create a new loan (lend a book)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanView),
        (status = 400, description = "Missing student or book"),
        (status = 404, description = "Student or book not found"),
        (status = 409, description = "Book already on loan")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanView>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (Some(student_id), Some(book_id)) = (request.student_id, request.book_id) else {
        return Err(AppError::Validation(
            "A student and a book must be selected".to_string(),
        ));
    };

    let loan = state
        .services
        .loans
        .create_loan(student_id, book_id, request.due_days.as_ref(), Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Mark a loan returned
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body(content = ReturnLoanRequest, description = "Optional return timestamp"),
    responses(
        (status = 200, description = "Loan returned", body = LoanView),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
    body: Option<Json<ReturnLoanRequest>>,
) -> AppResult<Json<LoanView>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let loan = state
        .services
        .loans
        .return_loan(loan_id, request.returned_at, Utc::now())
        .await?;
    Ok(Json(loan))
}

/// Delete a loan
#[utoipa::path(
    delete,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 204, description = "Loan deleted"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn delete_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.loans.delete_loan(loan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
