//! HTTP client for the loan store REST API

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::LoanStore;
use crate::{
    config::StoreConfig,
    error::{AppError, AppResult},
    models::loan::{LoanQuery, LoanRecord, NewLoan},
};

#[derive(Clone)]
pub struct HttpLoanStore {
    client: Client,
    base_url: String,
}

/// Error body of the loan store (`detail` is a string or a list of field errors)
#[derive(Deserialize)]
struct StoreErrorBody {
    detail: serde_json::Value,
}

#[derive(Serialize)]
struct ReturnRequest {
    return_date: Option<DateTime<Utc>>,
}

impl HttpLoanStore {
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success store response into the matching application error
    async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = match response.json::<StoreErrorBody>().await {
            Ok(StoreErrorBody { detail: serde_json::Value::String(s) }) => s,
            Ok(StoreErrorBody { detail }) => detail.to_string(),
            Err(_) => status.to_string(),
        };

        Err(match status {
            StatusCode::NOT_FOUND => AppError::NotFound(detail),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => AppError::Conflict(detail),
            StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(detail),
            _ => AppError::Store(format!("Loan store responded with {}: {}", status, detail)),
        })
    }
}

#[async_trait]
impl LoanStore for HttpLoanStore {
    async fn list_loans(&self, query: &LoanQuery) -> AppResult<Vec<LoanRecord>> {
        let response = self
            .client
            .get(self.url("/loans/"))
            .query(query)
            .send()
            .await?;

        let loans = Self::check(response).await?.json::<Vec<LoanRecord>>().await?;
        tracing::debug!("Fetched {} loans from store", loans.len());
        Ok(loans)
    }

    async fn get_loan(&self, id: i32) -> AppResult<LoanRecord> {
        let response = self
            .client
            .get(self.url(&format!("/loans/{}", id)))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_loan(&self, loan: &NewLoan) -> AppResult<LoanRecord> {
        let response = self
            .client
            .post(self.url("/loans/"))
            .json(loan)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn return_loan(
        &self,
        id: i32,
        returned_at: Option<DateTime<Utc>>,
    ) -> AppResult<LoanRecord> {
        let response = self
            .client
            .post(self.url(&format!("/loans/{}/return", id)))
            .json(&ReturnRequest { return_date: returned_at })
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_loan(&self, id: i32) -> AppResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/loans/{}", id)))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let response = self.client.get(self.url("/health")).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
