//! Loan management service
//!
//! Every mutation goes to the loan store first and then invalidates the
//! report cache, so the next report view refetches.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{reports::ReportCache, status};
use crate::{
    error::{AppError, AppResult},
    models::loan::{LoanQuery, LoanView, NewLoan},
    repository::LoanStore,
};

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn LoanStore>,
    cache: Arc<ReportCache>,
    default_due_days: i64,
}

impl LoansService {
    pub fn new(store: Arc<dyn LoanStore>, cache: Arc<ReportCache>, default_due_days: i64) -> Self {
        Self {
            store,
            cache,
            default_due_days,
        }
    }

    /// List loans with their status at `now`
    pub async fn list_loans(
        &self,
        query: &LoanQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<LoanView>> {
        let loans = self.store.list_loans(query).await?;
        Ok(loans.into_iter().map(|loan| status::evaluate(loan, now)).collect())
    }

    /// Get a loan with its status at `now`
    pub async fn get_loan(&self, loan_id: i32, now: DateTime<Utc>) -> AppResult<LoanView> {
        let loan = self.store.get_loan(loan_id).await?;
        Ok(status::evaluate(loan, now))
    }

    /// Lend a book to a student; the due date is `now` plus the resolved loan period
    pub async fn create_loan(
        &self,
        student_id: i32,
        book_id: i32,
        due_days: Option<&serde_json::Value>,
        now: DateTime<Utc>,
    ) -> AppResult<LoanView> {
        if student_id <= 0 || book_id <= 0 {
            return Err(AppError::Validation(
                "A student and a book must be selected".to_string(),
            ));
        }

        let days = status::resolve_due_days(due_days, self.default_due_days);
        let due_date = status::due_date_for(now, days).ok_or_else(|| {
            AppError::Validation(format!("Loan period of {} days is out of range", days))
        })?;
        let new_loan = NewLoan {
            student_id,
            book_id,
            due_date: Some(due_date),
        };

        let created = self.store.create_loan(&new_loan).await?;
        self.cache.invalidate().await;

        // The store stamps loan_date with its own clock
        if !status::dates_consistent(&created) {
            tracing::warn!(
                "Loan {} is due before it starts (loan date {:?}, due date {:?})",
                created.id,
                created.loan_date,
                created.due_date
            );
        }

        let view = status::evaluate(created, now);
        tracing::info!(
            "Loan {} created ({}): student {} borrowed book {} for {} days",
            view.loan.id,
            view.status,
            student_id,
            book_id,
            days
        );

        Ok(view)
    }

    /// Mark a loan returned. Returning is terminal: a returned loan cannot be returned again.
    pub async fn return_loan(
        &self,
        loan_id: i32,
        returned_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<LoanView> {
        let current = self.store.get_loan(loan_id).await?;

        if current.returned {
            return Err(AppError::Conflict("Loan already returned".to_string()));
        }

        if let (Some(at), Some(start)) = (returned_at, current.loan_date) {
            if at < start {
                return Err(AppError::Validation(
                    "Return date cannot precede the loan date".to_string(),
                ));
            }
        }

        let updated = self.store.return_loan(loan_id, returned_at).await?;
        self.cache.invalidate().await;

        tracing::info!("Loan {} returned", loan_id);

        Ok(status::evaluate(updated, now))
    }

    /// Hard-delete a loan
    pub async fn delete_loan(&self, loan_id: i32) -> AppResult<()> {
        self.store.delete_loan(loan_id).await?;
        self.cache.invalidate().await;

        tracing::info!("Loan {} deleted", loan_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::loan::{LoanRecord, LoanStatus},
        repository::MockLoanStore,
    };
    use chrono::{Duration, TimeZone};
    use mockall::predicate::eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 22, 9, 0, 0).unwrap()
    }

    fn record(id: i32, returned: bool) -> LoanRecord {
        LoanRecord {
            id,
            student_id: 4,
            book_id: 9,
            loan_date: Some(now()),
            due_date: Some(now() + Duration::days(7)),
            returned,
            returned_at: returned.then(|| now() + Duration::days(3)),
            student: None,
            book: None,
        }
    }

    fn service(store: MockLoanStore) -> (LoansService, Arc<ReportCache>) {
        let store: Arc<dyn LoanStore> = Arc::new(store);
        let cache = Arc::new(ReportCache::new(Arc::clone(&store)));
        (LoansService::new(store, Arc::clone(&cache), 7), cache)
    }

    #[tokio::test]
    async fn test_create_uses_default_period_and_invalidates_cache() {
        let mut store = MockLoanStore::new();
        store.expect_list_loans().times(1).returning(|_| Ok(vec![]));
        store
            .expect_create_loan()
            .withf(|loan| {
                loan.student_id == 4
                    && loan.book_id == 9
                    && loan.due_date == Some(now() + Duration::days(7))
            })
            .times(1)
            .returning(|_| Ok(record(1, false)));

        let (loans, cache) = service(store);
        cache.ensure_fresh().await.unwrap();
        assert!(cache.is_fresh().await);

        let view = loans.create_loan(4, 9, None, now()).await.unwrap();
        assert_eq!(view.status, LoanStatus::Active);
        assert_eq!(view.metrics.planned_days, Some(7));
        assert!(!cache.is_fresh().await);
    }

    #[tokio::test]
    async fn test_create_with_invalid_period_falls_back() {
        let mut store = MockLoanStore::new();
        store
            .expect_create_loan()
            .withf(|loan| loan.due_date == Some(now() + Duration::days(7)))
            .times(1)
            .returning(|_| Ok(record(1, false)));

        let (loans, _) = service(store);
        let requested = serde_json::json!("-2");
        loans.create_loan(4, 9, Some(&requested), now()).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_with_huge_period_is_rejected() {
        let mut store = MockLoanStore::new();
        store.expect_create_loan().never();

        let (loans, _) = service(store);
        let requested = serde_json::json!(1_000_000_000);
        let err = loans
            .create_loan(4, 9, Some(&requested), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let requested = serde_json::json!("999999999999999");
        let err = loans
            .create_loan(4, 9, Some(&requested), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_tolerates_store_clock_skew() {
        let mut store = MockLoanStore::new();
        store.expect_create_loan().times(1).returning(|_| {
            let mut created = record(1, false);
            created.loan_date = Some(now() + Duration::days(10));
            Ok(created)
        });

        let (loans, _) = service(store);
        let view = loans.create_loan(4, 9, None, now()).await.unwrap();
        assert!(!status::dates_consistent(&view.loan));
        assert_eq!(view.metrics.planned_days, Some(0));
    }

    #[tokio::test]
    async fn test_create_without_selection_never_reaches_store() {
        let mut store = MockLoanStore::new();
        store.expect_create_loan().never();

        let (loans, _) = service(store);
        let err = loans.create_loan(0, 9, None, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_return_already_returned_is_rejected() {
        let mut store = MockLoanStore::new();
        store
            .expect_get_loan()
            .with(eq(2))
            .times(1)
            .returning(|id| Ok(record(id, true)));
        store.expect_return_loan().never();

        let (loans, _) = service(store);
        let err = loans.return_loan(2, None, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_return_before_loan_date_is_rejected() {
        let mut store = MockLoanStore::new();
        store
            .expect_get_loan()
            .returning(|id| Ok(record(id, false)));
        store.expect_return_loan().never();

        let (loans, _) = service(store);
        let err = loans
            .return_loan(2, Some(now() - Duration::days(1)), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_return_marks_loan_returned() {
        let mut store = MockLoanStore::new();
        store
            .expect_get_loan()
            .returning(|id| Ok(record(id, false)));
        store
            .expect_return_loan()
            .with(eq(2), eq(None))
            .times(1)
            .returning(|id, _| Ok(record(id, true)));

        let (loans, _) = service(store);
        let view = loans
            .return_loan(2, None, now() + Duration::days(3))
            .await
            .unwrap();
        assert_eq!(view.status, LoanStatus::Returned);
        assert_eq!(view.metrics.duration_until_return_days, Some(3));
        assert_eq!(view.metrics.delay_days, Some(0));
    }

    #[tokio::test]
    async fn test_delete_propagates_store_errors() {
        let mut store = MockLoanStore::new();
        store
            .expect_delete_loan()
            .with(eq(5))
            .returning(|_| Err(AppError::NotFound("Loan not found".to_string())));

        let (loans, _) = service(store);
        let err = loans.delete_loan(5).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
