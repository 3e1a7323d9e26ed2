//! Report rows and filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::loan::LoanStatus;

/// Flattened loan line for on-screen reports and CSV export.
///
/// Absent values stay `None` here; they only become the absent marker when rendered.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReportRow {
    pub loan_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub grade: Option<String>,
    pub major: Option<String>,
    pub book_name: Option<String>,
    pub status: LoanStatus,
    pub loan_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub planned_days: Option<i64>,
    pub duration_until_return_days: Option<i64>,
    pub delay_days: Option<i64>,
}

/// Report filters; empty or missing values do not filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportFilter {
    /// Case-insensitive substring of the student's full name
    pub name: Option<String>,
    /// Case-insensitive exact grade
    pub grade: Option<String>,
    /// Case-insensitive exact major
    pub major: Option<String>,
}

impl ReportFilter {
    /// Whether no filter field carries a value
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.grade, &self.major]
            .iter()
            .all(|field| normalized(field).is_none())
    }
}

/// Trimmed, lowercased filter value, `None` when empty
pub(crate) fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// Loan counts per status over a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoanSummary {
    pub total: usize,
    pub active: usize,
    pub overdue: usize,
    pub returned: usize,
}

/// Filtered report with an optional user-facing notice
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ReportView {
    pub rows: Vec<ReportRow>,
    pub total: usize,
    /// Set when the loan store could not be reached and the rows fell back to empty
    pub notice: Option<String>,
}
