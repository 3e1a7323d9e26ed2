//! Access to the external loan store
//!
//! The loan store owns books, students and loans. This service only reads
//! loan records (with embedded relations) and asks the store to create,
//! return or delete loans.

pub mod loans;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

use crate::{
    error::AppResult,
    models::loan::{LoanQuery, LoanRecord, NewLoan},
};

pub use loans::HttpLoanStore;

/// Request/response contract of the loan store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// List loans in store order, optionally filtered
    async fn list_loans(&self, query: &LoanQuery) -> AppResult<Vec<LoanRecord>>;

    /// Fetch a single loan
    async fn get_loan(&self, id: i32) -> AppResult<LoanRecord>;

    /// Create a loan and return it with embedded relations
    async fn create_loan(&self, loan: &NewLoan) -> AppResult<LoanRecord>;

    /// Mark a loan returned; the store uses its own clock when `returned_at` is `None`
    async fn return_loan(
        &self,
        id: i32,
        returned_at: Option<DateTime<Utc>>,
    ) -> AppResult<LoanRecord>;

    /// Hard-delete a loan
    async fn delete_loan(&self, id: i32) -> AppResult<()>;

    /// Connectivity check
    async fn ping(&self) -> AppResult<()>;
}
