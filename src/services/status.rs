//! Loan status engine
//!
//! Classifies a loan as active, overdue or returned relative to an explicit
//! evaluation instant and computes its day metrics. Nothing here is stored:
//! every call recomputes from the raw record, so the status cannot drift from
//! the dates it is derived from.

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::DEFAULT_DUE_DAYS,
    dates::days_between,
    models::loan::{LoanMetrics, LoanRecord, LoanStatus, LoanView},
};

/// Classify a loan at `now`.
///
/// A loan without a usable due date is never overdue.
pub fn classify(loan: &LoanRecord, now: DateTime<Utc>) -> LoanStatus {
    if loan.returned {
        return LoanStatus::Returned;
    }

    match loan.due_date {
        Some(due) if due < now => LoanStatus::Overdue,
        _ => LoanStatus::Active,
    }
}

/// Compute the day metrics of a loan at `now`
pub fn metrics(loan: &LoanRecord, now: DateTime<Utc>) -> LoanMetrics {
    let status = classify(loan, now);

    let planned_days = match (loan.loan_date, loan.due_date) {
        (Some(start), Some(due)) => Some(days_between(start, due).max(0)),
        _ => None,
    };

    // A stale returned_at on an unreturned loan is ignored
    let duration_until_return_days = match (status, loan.loan_date, loan.returned_at) {
        (LoanStatus::Returned, Some(start), Some(back)) => Some(days_between(start, back).max(0)),
        _ => None,
    };

    let delay_days = match status {
        LoanStatus::Returned => match (loan.due_date, loan.returned_at) {
            (Some(due), Some(back)) => Some(days_between(due, back).max(0)),
            _ => None,
        },
        LoanStatus::Overdue => loan.due_date.map(|due| days_between(due, now)),
        LoanStatus::Active => None,
    };

    LoanMetrics {
        planned_days,
        duration_until_return_days,
        delay_days,
    }
}

/// Status and metrics of a loan at `now`
pub fn evaluate(loan: LoanRecord, now: DateTime<Utc>) -> LoanView {
    LoanView {
        status: classify(&loan, now),
        metrics: metrics(&loan, now),
        loan,
    }
}

/// Due date of a loan starting at `loan_date` and lasting `days` days.
///
/// Returns `None` when the period does not fit in the calendar.
pub fn due_date_for(loan_date: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|period| loan_date.checked_add_signed(period))
}

/// Whether the store's dates respect `loan_date <= due_date` (unknown dates pass)
pub fn dates_consistent(loan: &LoanRecord) -> bool {
    match (loan.loan_date, loan.due_date) {
        (Some(start), Some(due)) => due >= start,
        _ => true,
    }
}

/// Resolve a requested loan period.
///
/// Accepts a JSON integer or a numeric string. Missing, non-positive and
/// non-numeric values fall back to `default_days` (itself replaced by the
/// built-in default when not positive).
pub fn resolve_due_days(requested: Option<&serde_json::Value>, default_days: i64) -> i64 {
    let fallback = if default_days > 0 {
        default_days
    } else {
        DEFAULT_DUE_DAYS
    };

    let parsed = match requested {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(days) if days > 0 => days,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn loan(loan_date: Option<DateTime<Utc>>, due_date: Option<DateTime<Utc>>) -> LoanRecord {
        LoanRecord {
            id: 1,
            student_id: 1,
            book_id: 1,
            loan_date,
            due_date,
            returned: false,
            returned_at: None,
            student: None,
            book: None,
        }
    }

    fn returned(mut record: LoanRecord, at: Option<DateTime<Utc>>) -> LoanRecord {
        record.returned = true;
        record.returned_at = at;
        record
    }

    #[test]
    fn test_overdue_scenario() {
        let start = day(2024, 9, 22);
        let due = due_date_for(start, resolve_due_days(None, 7)).unwrap();
        assert_eq!(due, day(2024, 9, 29));

        let record = loan(Some(start), Some(due));
        let now = day(2024, 10, 5);

        assert_eq!(classify(&record, now), LoanStatus::Overdue);
        let m = metrics(&record, now);
        assert_eq!(m.delay_days, Some(6));
        assert_eq!(m.duration_until_return_days, None);
        assert_eq!(m.planned_days, Some(7));
    }

    #[test]
    fn test_returned_late_scenario() {
        let record = returned(
            loan(Some(day(2024, 9, 22)), Some(day(2024, 9, 29))),
            Some(day(2024, 10, 2)),
        );
        let now = day(2024, 10, 5);

        assert_eq!(classify(&record, now), LoanStatus::Returned);
        let m = metrics(&record, now);
        assert_eq!(m.delay_days, Some(3));
        assert_eq!(m.duration_until_return_days, Some(10));
    }

    #[test]
    fn test_returned_early_has_zero_delay() {
        let record = returned(
            loan(Some(day(2024, 9, 22)), Some(day(2024, 9, 29))),
            Some(day(2024, 9, 25)),
        );
        let m = metrics(&record, day(2024, 12, 1));
        assert_eq!(m.delay_days, Some(0));
        assert_eq!(m.duration_until_return_days, Some(3));
    }

    #[test]
    fn test_moving_now_before_due_flips_to_active() {
        let record = loan(Some(day(2024, 9, 22)), Some(day(2024, 9, 29)));
        assert_eq!(classify(&record, day(2024, 10, 5)), LoanStatus::Overdue);
        assert_eq!(classify(&record, day(2024, 9, 28)), LoanStatus::Active);
        assert_eq!(classify(&record, day(2024, 9, 29)), LoanStatus::Active);
    }

    #[test]
    fn test_active_loan_has_no_delay_or_duration() {
        let record = loan(Some(day(2024, 9, 22)), Some(day(2024, 9, 29)));
        let m = metrics(&record, day(2024, 9, 24));
        assert_eq!(m.delay_days, None);
        assert_eq!(m.duration_until_return_days, None);
        assert_eq!(m.planned_days, Some(7));
    }

    #[test]
    fn test_missing_due_date_is_active_with_absent_metrics() {
        let record = loan(Some(day(2024, 9, 22)), None);
        let now = day(2030, 1, 1);
        assert_eq!(classify(&record, now), LoanStatus::Active);
        assert_eq!(metrics(&record, now), LoanMetrics::default());
    }

    #[test]
    fn test_stale_returned_at_ignored_when_not_returned() {
        let mut record = loan(Some(day(2024, 9, 22)), Some(day(2024, 9, 29)));
        record.returned_at = Some(day(2024, 9, 23));
        let m = metrics(&record, day(2024, 9, 24));
        assert_eq!(m.duration_until_return_days, None);
        assert_eq!(m.delay_days, None);
    }

    #[test]
    fn test_returned_without_timestamp_yields_absent_metrics() {
        let record = returned(loan(Some(day(2024, 9, 22)), Some(day(2024, 9, 29))), None);
        let m = metrics(&record, day(2024, 10, 5));
        assert_eq!(m.duration_until_return_days, None);
        assert_eq!(m.delay_days, None);
        assert_eq!(m.planned_days, Some(7));
    }

    #[test]
    fn test_evaluate_keeps_record() {
        let record = loan(Some(day(2024, 9, 22)), Some(day(2024, 9, 29)));
        let view = evaluate(record.clone(), day(2024, 10, 5));
        assert_eq!(view.loan, record);
        assert_eq!(view.status, LoanStatus::Overdue);
        assert_eq!(view.metrics.delay_days, Some(6));
    }

    #[test]
    fn test_resolve_due_days() {
        assert_eq!(resolve_due_days(None, 7), 7);
        assert_eq!(resolve_due_days(Some(&json!(14)), 7), 14);
        assert_eq!(resolve_due_days(Some(&json!("10")), 7), 10);
        assert_eq!(resolve_due_days(Some(&json!(0)), 7), 7);
        assert_eq!(resolve_due_days(Some(&json!(-3)), 7), 7);
        assert_eq!(resolve_due_days(Some(&json!("abc")), 7), 7);
        assert_eq!(resolve_due_days(Some(&json!(2.5)), 7), 7);
        assert_eq!(resolve_due_days(Some(&json!(null)), 7), 7);
        assert_eq!(resolve_due_days(None, 0), DEFAULT_DUE_DAYS);
    }

    #[test]
    fn test_due_date_for_huge_period_is_none() {
        let start = day(2024, 9, 22);
        assert_eq!(due_date_for(start, 1_000_000_000), None);
        assert_eq!(due_date_for(start, 999_999_999_999_999), None);
        assert_eq!(due_date_for(start, i64::MAX), None);
        assert_eq!(due_date_for(start, 30), Some(day(2024, 10, 22)));
    }

    #[test]
    fn test_overdue_delay_rounds_to_nearest_day() {
        let record = loan(Some(day(2024, 9, 22)), Some(day(2024, 9, 29)));

        // 5 days 14h24m past due
        let now = day(2024, 10, 4) + Duration::minutes(14 * 60 + 24);
        assert_eq!(metrics(&record, now).delay_days, Some(6));

        // 5 days 9h past due
        let now = day(2024, 10, 4) + Duration::hours(9);
        assert_eq!(metrics(&record, now).delay_days, Some(5));
    }

    #[test]
    fn test_returned_delay_and_duration_round_to_nearest_day() {
        let start = day(2024, 9, 22) + Duration::hours(8);
        let due = day(2024, 9, 29) + Duration::hours(8);
        let back = due + Duration::hours(12);
        let record = returned(loan(Some(start), Some(due)), Some(back));

        let m = metrics(&record, day(2024, 12, 1));
        assert_eq!(m.delay_days, Some(1));
        assert_eq!(m.duration_until_return_days, Some(8));
        assert_eq!(m.planned_days, Some(7));

        // Returned 11h late rounds down
        let record = returned(loan(Some(start), Some(due)), Some(due + Duration::hours(11)));
        assert_eq!(metrics(&record, day(2024, 12, 1)).delay_days, Some(0));
    }

    #[test]
    fn test_dates_consistent() {
        let record = loan(Some(day(2024, 9, 22)), Some(day(2024, 9, 29)));
        assert!(dates_consistent(&record));
        assert!(dates_consistent(&loan(None, Some(day(2024, 9, 29)))));
        assert!(!dates_consistent(&loan(Some(day(2024, 9, 29)), Some(day(2024, 9, 22)))));
    }
}
