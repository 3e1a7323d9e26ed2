//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::book::BookSnapshot;
use super::student::StudentSnapshot;
use crate::dates;

/// Loan record as returned by the loan store, with embedded relations.
///
/// Dates the store sends in an unreadable shape decode as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoanRecord {
    pub id: i32,
    pub student_id: i32,
    pub book_id: i32,
    #[serde(default, deserialize_with = "dates::deserialize_lenient")]
    pub loan_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "dates::deserialize_lenient")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub returned: bool,
    #[serde(default, alias = "return_date", deserialize_with = "dates::deserialize_lenient")]
    pub returned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub student: Option<StudentSnapshot>,
    #[serde(default)]
    pub book: Option<BookSnapshot>,
}

/// Lifecycle classification of a loan, always derived and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day-granularity metrics for a loan; `None` means not applicable or not computable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct LoanMetrics {
    /// Days between loan date and due date
    pub planned_days: Option<i64>,
    /// Days between loan date and return (returned loans only)
    pub duration_until_return_days: Option<i64>,
    /// Days past the due date
    pub delay_days: Option<i64>,
}

/// Loan with its derived status and metrics
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanView {
    pub loan: LoanRecord,
    pub status: LoanStatus,
    pub metrics: LoanMetrics,
}

/// Filters understood by the loan store list endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanQuery {
    /// Only returned (`true`) or only unreturned (`false`) loans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<i32>,
}

/// Create loan payload sent to the loan store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLoan {
    pub student_id: i32,
    pub book_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}
