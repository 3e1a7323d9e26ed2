//! Loan reports: filtering, projection to report rows and the snapshot cache

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{
    export::{self, ExportOutcome},
    status,
};
use crate::{
    error::AppResult,
    models::{
        loan::{LoanQuery, LoanRecord, LoanStatus},
        report::{normalized, LoanSummary, ReportFilter, ReportRow, ReportView},
    },
    repository::LoanStore,
};

/// Locally held snapshot of all loans, shared by every report view.
///
/// Loan mutations call [`ReportCache::invalidate`]; report views call
/// [`ReportCache::ensure_fresh`], which refetches only after an invalidation.
/// The lock is held across the fetch so an invalidation cannot interleave
/// with a refresh.
pub struct ReportCache {
    store: Arc<dyn LoanStore>,
    snapshot: Mutex<Option<Arc<Vec<LoanRecord>>>>,
}

impl ReportCache {
    pub fn new(store: Arc<dyn LoanStore>) -> Self {
        Self {
            store,
            snapshot: Mutex::new(None),
        }
    }

    /// Drop the snapshot so the next report view refetches
    pub async fn invalidate(&self) {
        let mut snapshot = self.snapshot.lock().await;
        if snapshot.take().is_some() {
            tracing::debug!("Report cache invalidated");
        }
    }

    /// Return the snapshot, fetching it from the loan store if needed.
    ///
    /// A failed fetch leaves the cache empty.
    pub async fn ensure_fresh(&self) -> AppResult<Arc<Vec<LoanRecord>>> {
        let mut snapshot = self.snapshot.lock().await;
        if let Some(loans) = snapshot.as_ref() {
            return Ok(Arc::clone(loans));
        }

        let loans = Arc::new(self.store.list_loans(&LoanQuery::default()).await?);
        tracing::debug!("Report cache refreshed with {} loans", loans.len());
        *snapshot = Some(Arc::clone(&loans));
        Ok(loans)
    }

    pub async fn is_fresh(&self) -> bool {
        self.snapshot.lock().await.is_some()
    }
}

/// Split a full name into (first name, last name).
///
/// The last whitespace-separated token is the last name; the others, joined
/// by single spaces, are the first name. A single token is a first name only.
pub fn split_name(full_name: &str) -> (Option<String>, Option<String>) {
    let mut tokens: Vec<&str> = full_name.split_whitespace().collect();
    match tokens.len() {
        0 => (None, None),
        1 => (Some(tokens[0].to_string()), None),
        _ => {
            let last = tokens.pop().map(str::to_string);
            (Some(tokens.join(" ")), last)
        }
    }
}

/// Whether a loan passes every non-empty filter
pub fn matches(loan: &LoanRecord, filter: &ReportFilter) -> bool {
    if filter.is_empty() {
        return true;
    }

    let name = normalized(&filter.name);
    let grade = normalized(&filter.grade);
    let major = normalized(&filter.major);

    let Some(student) = loan.student.as_ref() else {
        return false;
    };

    let name_ok = name
        .map(|q| student.full_name.to_lowercase().contains(&q))
        .unwrap_or(true);
    let grade_ok = grade
        .map(|q| normalized(&student.grade).as_deref() == Some(q.as_str()))
        .unwrap_or(true);
    let major_ok = major
        .map(|q| normalized(&student.major).as_deref() == Some(q.as_str()))
        .unwrap_or(true);

    name_ok && grade_ok && major_ok
}

/// Flatten one loan into a report row evaluated at `now`
pub fn to_row(loan: &LoanRecord, now: DateTime<Utc>) -> ReportRow {
    let status = status::classify(loan, now);
    let metrics = status::metrics(loan, now);

    let (first_name, last_name) = loan
        .student
        .as_ref()
        .map(|s| split_name(&s.full_name))
        .unwrap_or((None, None));

    let non_blank = |value: Option<&String>| {
        value
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    ReportRow {
        loan_id: loan.id,
        first_name,
        last_name,
        grade: non_blank(loan.student.as_ref().and_then(|s| s.grade.as_ref())),
        major: non_blank(loan.student.as_ref().and_then(|s| s.major.as_ref())),
        book_name: non_blank(loan.book.as_ref().map(|b| &b.name)),
        status,
        loan_date: loan.loan_date,
        return_date: if status == LoanStatus::Returned {
            loan.returned_at
        } else {
            None
        },
        planned_days: metrics.planned_days,
        duration_until_return_days: metrics.duration_until_return_days,
        delay_days: metrics.delay_days,
    }
}

/// Filter and flatten loans, keeping their relative order
pub fn project(loans: &[LoanRecord], filter: &ReportFilter, now: DateTime<Utc>) -> Vec<ReportRow> {
    loans
        .iter()
        .filter(|loan| matches(loan, filter))
        .map(|loan| to_row(loan, now))
        .collect()
}

/// Count loans per status
pub fn summarize(loans: &[LoanRecord], now: DateTime<Utc>) -> LoanSummary {
    loans.iter().fold(
        LoanSummary {
            total: loans.len(),
            ..Default::default()
        },
        |mut summary, loan| {
            match status::classify(loan, now) {
                LoanStatus::Active => summary.active += 1,
                LoanStatus::Overdue => summary.overdue += 1,
                LoanStatus::Returned => summary.returned += 1,
            }
            summary
        },
    )
}

#[derive(Clone)]
pub struct ReportsService {
    cache: Arc<ReportCache>,
    export_filename: String,
}

impl ReportsService {
    pub fn new(cache: Arc<ReportCache>, export_filename: String) -> Self {
        Self {
            cache,
            export_filename,
        }
    }

    /// Filtered loan report; an unreachable store yields an empty report with a notice
    pub async fn loan_report(&self, filter: &ReportFilter, now: DateTime<Utc>) -> ReportView {
        match self.cache.ensure_fresh().await {
            Ok(loans) => {
                let rows = project(&loans, filter, now);
                ReportView {
                    total: rows.len(),
                    rows,
                    notice: None,
                }
            }
            Err(e) => {
                tracing::warn!("Loan report unavailable: {}", e);
                ReportView {
                    rows: Vec::new(),
                    total: 0,
                    notice: Some(format!("Loans could not be loaded: {}", e)),
                }
            }
        }
    }

    /// Rows of loans overdue at `now`
    pub async fn overdue_report(&self, now: DateTime<Utc>) -> ReportView {
        let mut view = self.loan_report(&ReportFilter::default(), now).await;
        view.rows.retain(|row| row.status == LoanStatus::Overdue);
        view.total = view.rows.len();
        view
    }

    pub async fn summary(&self, now: DateTime<Utc>) -> AppResult<LoanSummary> {
        let loans = self.cache.ensure_fresh().await?;
        Ok(summarize(&loans, now))
    }

    /// Render the filtered report as CSV
    pub async fn export(
        &self,
        filter: &ReportFilter,
        now: DateTime<Utc>,
    ) -> AppResult<ExportOutcome> {
        let loans = self.cache.ensure_fresh().await?;
        let rows = project(&loans, filter, now);
        export::export_rows(&rows, &self.export_filename)
    }

    /// Force the next report view to refetch
    pub async fn refresh(&self) {
        self.cache.invalidate().await;
    }
}
