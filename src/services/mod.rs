//! Business logic services

pub mod export;
pub mod loans;
pub mod reports;
pub mod status;

use std::sync::Arc;

use crate::{config::AppConfig, repository::LoanStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub loans: loans::LoansService,
    pub reports: reports::ReportsService,
    pub store: Arc<dyn LoanStore>,
}

impl Services {
    /// Create all services around one loan store and one shared report cache
    pub fn new(store: Arc<dyn LoanStore>, config: &AppConfig) -> Self {
        let cache = Arc::new(reports::ReportCache::new(Arc::clone(&store)));

        Self {
            loans: loans::LoansService::new(
                Arc::clone(&store),
                Arc::clone(&cache),
                config.loans.due_days(),
            ),
            reports: reports::ReportsService::new(cache, config.report.export_filename.clone()),
            store,
        }
    }
}
